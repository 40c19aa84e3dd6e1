use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Market regime classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// Price above both moving averages with a rising trend
    Bull,

    /// Price below both moving averages with a falling trend
    Bear,

    /// Mixed or transitional signals
    Neutral,
}

impl Regime {
    /// Lowercase name used in scenario labels
    pub fn label(&self) -> &'static str {
        match self {
            Regime::Bull => "bull",
            Regime::Bear => "bear",
            Regime::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Regime::Bull => "BULL",
            Regime::Bear => "BEAR",
            Regime::Neutral => "NEUTRAL",
        };
        write!(f, "{name}")
    }
}

/// Sentiment bucket supplied by the news scorer (or any external source)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBucket {
    Positive,
    Neutral,
    Negative,
}

impl SentimentBucket {
    pub fn label(&self) -> &'static str {
        match self {
            SentimentBucket::Positive => "positive",
            SentimentBucket::Neutral => "neutral",
            SentimentBucket::Negative => "negative",
        }
    }
}

/// Sentiment reading for one ticker: numeric score, bucket, danger flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentSignal {
    /// -1.0 to +1.0
    pub score: f64,
    pub bucket: SentimentBucket,
    /// True when crisis-level negative news is detected
    pub danger: bool,
}

impl SentimentSignal {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            bucket: SentimentBucket::Neutral,
            danger: false,
        }
    }
}

/// Regime x sentiment combination used as the memory lookup key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// e.g. "bull_positive", "bear_negative_danger"
    pub label: String,
    pub regime: Regime,
    pub sentiment: SentimentSignal,
}

impl Scenario {
    pub fn is_danger(&self) -> bool {
        self.sentiment.danger
    }
}

/// Trade direction for an executable signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "BUY"),
            TradeDirection::Sell => write!(f, "SELL"),
        }
    }
}

/// Proposed action, as it arrives at the risk gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    pub fn direction(&self) -> Option<TradeDirection> {
        match self {
            TradeAction::Buy => Some(TradeDirection::Buy),
            TradeAction::Sell => Some(TradeDirection::Sell),
            TradeAction::Hold => None,
        }
    }
}

impl From<TradeDirection> for TradeAction {
    fn from(d: TradeDirection) -> Self {
        match d {
            TradeDirection::Buy => TradeAction::Buy,
            TradeDirection::Sell => TradeAction::Sell,
        }
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Entry/stop/target proposal for the current bar only. Does not persist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalProposal {
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub direction: TradeDirection,
}

impl SignalProposal {
    /// Distance from entry to stop
    pub fn risk_per_share(&self) -> f64 {
        (self.entry - self.stop).abs()
    }

    /// Target distance over stop distance
    pub fn reward_risk(&self) -> f64 {
        let risk = self.risk_per_share();
        if risk > 0.0 {
            (self.target - self.entry).abs() / risk
        } else {
            0.0
        }
    }
}

/// Backtest metrics for one candidate strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    pub name: String,
    /// 0.0 - 1.0, over active (signal-bearing) bars only
    pub win_rate: f64,
    /// Mean per-trade return over active bars (decimal)
    pub avg_return: f64,
    /// Worst peak-to-trough equity decline (decimal, positive)
    pub max_drawdown: f64,
    /// Annualised mean/stdev of the full return series
    pub sharpe: f64,
    /// Filled by the selector, not the backtester
    pub composite_score: f64,
}

impl StrategyResult {
    pub fn zero(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            win_rate: 0.0,
            avg_return: 0.0,
            max_drawdown: 0.0,
            sharpe: 0.0,
            composite_score: 0.0,
        }
    }
}

/// Outcome state of a recorded trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    Open,
    Win,
    Loss,
    Scratch,
}

impl TradeOutcome {
    pub fn is_closed(&self) -> bool {
        !matches!(self, TradeOutcome::Open)
    }
}

/// A single trade logged by the pipeline. Created on open, mutated exactly
/// once when the outcome becomes known, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub scenario_label: String,
    pub strategy_name: String,
    pub regime_trend: String,
    pub news_bucket: String,
    pub ticker: String,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    /// Number of shares
    pub size: u64,
    pub risk_per_share: f64,
    pub rr_ratio: f64,
    pub outcome: TradeOutcome,
    pub pnl_pct: f64,
    pub exit_price: Option<f64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Immutable output of the risk engine. Check `killed` before execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedTrade {
    pub ticker: String,
    pub action: TradeAction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    /// Integer shares, 0 when killed
    pub position_size: u64,
    pub risk_per_share: f64,
    pub total_risk: f64,
    pub risk_reward_ratio: f64,
    pub conviction_score: f64,
    pub regime: Regime,
    pub killed: bool,
    pub kill_reason: Option<String>,
}
