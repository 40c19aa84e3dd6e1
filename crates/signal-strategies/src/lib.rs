pub mod strategies;

pub use strategies::{
    BreakoutStrategy, MeanReversionStrategy, MomentumStrategy, NoTradeStrategy,
};

use decision_core::{Candle, Scenario, SignalProposal};

/// Name of the capital-preserving fallback strategy
pub const NO_TRADE: &str = "no_trade";

/// Common contract for all signal generators.
///
/// Implementations are stateless and deterministic: the same candle series
/// always yields the same proposal. Only the most recent bar may trigger a
/// signal; earlier bars are context.
pub trait SignalGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Evaluate the latest candle. `None` means no signal.
    fn evaluate(&self, candles: &[Candle]) -> Option<SignalProposal>;
}

/// All four generators, in registry order.
pub fn all_strategies() -> Vec<Box<dyn SignalGenerator>> {
    vec![
        Box::new(BreakoutStrategy),
        Box::new(MeanReversionStrategy),
        Box::new(MomentumStrategy),
        Box::new(NoTradeStrategy),
    ]
}

/// Candidate generators for a scenario, best-first, NoTrade always appended
/// as the fallback. A danger scenario collapses to NoTrade only.
pub fn candidates_for(scenario: &Scenario) -> Vec<Box<dyn SignalGenerator>> {
    if scenario.is_danger() {
        return vec![Box::new(NoTradeStrategy)];
    }

    let ordered: Vec<Box<dyn SignalGenerator>> = match scenario.label.as_str() {
        "bull_positive" | "bull_neutral" => {
            vec![Box::new(BreakoutStrategy), Box::new(MeanReversionStrategy)]
        }
        "bull_negative" | "neutral_positive" => {
            vec![Box::new(MeanReversionStrategy), Box::new(BreakoutStrategy)]
        }
        "neutral_neutral" => vec![Box::new(MeanReversionStrategy)],
        "neutral_negative" => {
            vec![Box::new(MomentumStrategy), Box::new(MeanReversionStrategy)]
        }
        "bear_positive" => {
            vec![Box::new(MeanReversionStrategy), Box::new(MomentumStrategy)]
        }
        "bear_neutral" | "bear_negative" => vec![Box::new(MomentumStrategy)],
        _ => vec![Box::new(MeanReversionStrategy)],
    };

    let mut candidates = ordered;
    candidates.push(Box::new(NoTradeStrategy));
    candidates
}
