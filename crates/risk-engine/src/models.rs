use decision_core::{Regime, TradeAction};
use serde::{Deserialize, Serialize};

/// Hard risk limits. Strategy code never touches these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fraction of portfolio equity risked per trade
    pub max_risk_fraction: f64,
    /// Stop distance in ATR multiples
    pub atr_stop_multiplier: f64,
    /// Minimum acceptable reward:risk ratio
    pub min_reward_risk: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_risk_fraction: 0.01,
            atr_stop_multiplier: 1.5,
            min_reward_risk: 2.0,
        }
    }
}

/// A trade proposal as it arrives at the risk gate.
///
/// Any upstream stop-loss suggestion is deliberately absent: the engine
/// always computes its own, so a caller cannot smuggle one in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeProposal {
    pub ticker: String,
    pub action: TradeAction,
    pub entry: f64,
    /// Advisory target; validated against reward:risk when supplied,
    /// defaulted to 2R when absent
    pub target: Option<f64>,
    /// 0.0 to 1.0
    pub conviction_score: f64,
    pub regime: Regime,
    /// Optional external sentiment score in [-1, 1]; deeply negative
    /// sentiment trims long positions outside a bull regime
    pub sentiment_score: Option<f64>,
}
