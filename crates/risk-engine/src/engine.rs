use decision_core::{DecisionError, Regime, TradeAction, ValidatedTrade};
use tracing::{info, warn};

use crate::models::{RiskConfig, TradeProposal};

/// Tolerance when comparing reward:risk against the configured minimum
const RR_EPSILON: f64 = 1e-6;

/// Sentiment below this trims long positions outside a bull regime
const SENTIMENT_PENALTY_FLOOR: f64 = -0.5;

/// Fraction of the position kept after the sentiment penalty
const SENTIMENT_SIZE_FACTOR: f64 = 0.75;

/// Deterministic enforcement gate for all trade proposals.
///
/// This is the only place stop-loss and position size are ever computed for
/// execution. A vetoed trade comes back as `Ok` with `killed = true` and a
/// reason; only contract violations (non-finite or out-of-range inputs) are
/// errors.
pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Apply the hard risk limits to a proposal.
    pub fn apply_limits(
        &self,
        proposal: &TradeProposal,
        atr: f64,
        equity: f64,
    ) -> Result<ValidatedTrade, DecisionError> {
        validate_inputs(proposal, atr, equity)?;

        let ticker = proposal.ticker.as_str();
        let action = proposal.action;
        let entry = proposal.entry;
        let regime = proposal.regime;

        info!(
            ticker,
            %action,
            entry,
            atr,
            equity,
            %regime,
            "risk gate start"
        );

        // HOLD never trades
        if action == TradeAction::Hold {
            return Ok(self.killed(proposal, "HOLD requires no trade", 0.0, 0.0));
        }

        // Regime guard: bull only longs, bear only shorts, neutral either way
        let allowed = match regime {
            Regime::Bull => action == TradeAction::Buy,
            Regime::Bear => action == TradeAction::Sell,
            Regime::Neutral => true,
        };
        if !allowed {
            return Ok(self.killed(
                proposal,
                &format!("trade direction {action} conflicts with {regime} regime"),
                0.0,
                0.0,
            ));
        }

        // Stop-loss is always recomputed here; caller stops are advisory only
        let stop_loss = match action {
            TradeAction::Buy => entry - self.config.atr_stop_multiplier * atr,
            _ => entry + self.config.atr_stop_multiplier * atr,
        };

        let risk_per_share = match action {
            TradeAction::Buy => entry - stop_loss,
            _ => stop_loss - entry,
        };
        if risk_per_share <= 0.0 {
            return Ok(self.killed(
                proposal,
                &format!("risk_per_share={risk_per_share:.4} is not positive"),
                stop_loss,
                risk_per_share,
            ));
        }

        // Default target is 2R on the trade side; a supplied target is still
        // held to the reward:risk minimum below
        let target = proposal.target.unwrap_or_else(|| match action {
            TradeAction::Buy => entry + self.config.min_reward_risk * risk_per_share,
            _ => entry - self.config.min_reward_risk * risk_per_share,
        });

        // Position sizing from the equity risk budget; longs additionally
        // cannot spend more cash than the account holds
        let max_risk = equity * self.config.max_risk_fraction;
        let mut position_size = (max_risk / risk_per_share).floor() as u64;
        if action == TradeAction::Buy {
            position_size = position_size.min((equity / entry).floor() as u64);
        }

        if position_size < 1 {
            return Ok(self.killed(
                proposal,
                "position_size=0: risk per share or entry too large for equity",
                stop_loss,
                risk_per_share,
            ));
        }

        // Optional sentiment penalty: deeply negative news trims longs
        // outside a bull regime
        if let Some(score) = proposal.sentiment_score {
            if score < SENTIMENT_PENALTY_FLOOR
                && action == TradeAction::Buy
                && matches!(regime, Regime::Bear | Regime::Neutral)
            {
                let trimmed = ((position_size as f64 * SENTIMENT_SIZE_FACTOR).floor() as u64).max(1);
                info!(
                    ticker,
                    score,
                    from = position_size,
                    to = trimmed,
                    "sentiment penalty applied"
                );
                position_size = trimmed;
            }
        }

        let total_risk = position_size as f64 * risk_per_share;

        let reward = match action {
            TradeAction::Buy => target - entry,
            _ => entry - target,
        };
        let risk_reward_ratio = (reward / risk_per_share).max(0.0);

        if risk_reward_ratio + RR_EPSILON < self.config.min_reward_risk {
            return Ok(self.killed(
                proposal,
                &format!(
                    "reward:risk {risk_reward_ratio:.2} below minimum {:.2}",
                    self.config.min_reward_risk
                ),
                stop_loss,
                risk_per_share,
            ));
        }

        info!(
            ticker,
            size = position_size,
            stop = stop_loss,
            target,
            rr = risk_reward_ratio,
            total_risk,
            "trade accepted"
        );

        Ok(ValidatedTrade {
            ticker: proposal.ticker.clone(),
            action,
            entry_price: entry,
            stop_loss,
            target_price: target,
            position_size,
            risk_per_share,
            total_risk,
            risk_reward_ratio,
            conviction_score: proposal.conviction_score,
            regime,
            killed: false,
            kill_reason: None,
        })
    }

    /// Build a vetoed trade carrying whatever was computed before the kill,
    /// for diagnostics.
    fn killed(
        &self,
        proposal: &TradeProposal,
        reason: &str,
        stop_loss: f64,
        risk_per_share: f64,
    ) -> ValidatedTrade {
        warn!(ticker = %proposal.ticker, reason, "trade killed");
        ValidatedTrade {
            ticker: proposal.ticker.clone(),
            action: proposal.action,
            entry_price: proposal.entry,
            stop_loss,
            target_price: proposal.target.unwrap_or(0.0),
            position_size: 0,
            risk_per_share,
            total_risk: 0.0,
            risk_reward_ratio: 0.0,
            conviction_score: proposal.conviction_score,
            regime: proposal.regime,
            killed: true,
            kill_reason: Some(reason.to_string()),
        }
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}

/// Contract checks that run before any trade logic. Violations here are
/// programming errors at the caller, not market conditions.
fn validate_inputs(proposal: &TradeProposal, atr: f64, equity: f64) -> Result<(), DecisionError> {
    let finite_positive = [
        ("entry", proposal.entry),
        ("atr", atr),
        ("portfolio equity", equity),
    ];
    for (name, value) in finite_positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(DecisionError::InvalidInput(format!(
                "[{}] {name} must be finite and > 0, got {value}",
                proposal.ticker
            )));
        }
    }

    if let Some(target) = proposal.target {
        if !target.is_finite() || target <= 0.0 {
            return Err(DecisionError::InvalidInput(format!(
                "[{}] target must be finite and > 0, got {target}",
                proposal.ticker
            )));
        }
    }

    let conviction = proposal.conviction_score;
    if !conviction.is_finite() || !(0.0..=1.0).contains(&conviction) {
        return Err(DecisionError::InvalidInput(format!(
            "[{}] conviction_score must be in [0, 1], got {conviction}",
            proposal.ticker
        )));
    }

    if let Some(score) = proposal.sentiment_score {
        if !score.is_finite() || !(-1.0..=1.0).contains(&score) {
            return Err(DecisionError::InvalidInput(format!(
                "[{}] sentiment_score must be in [-1, 1], got {score}",
                proposal.ticker
            )));
        }
    }

    Ok(())
}
