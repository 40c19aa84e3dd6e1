use std::env;

use anyhow::{Context, Result};
use risk_engine::RiskConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fraction of portfolio equity risked per trade
    pub max_risk_fraction: f64, // 0.01 (1%)
    /// Stop distance in ATR multiples
    pub atr_stop_multiplier: f64, // 1.5
    /// Minimum acceptable reward:risk
    pub min_reward_risk: f64, // 2.0
    /// Composite score floor for the selector
    pub composite_threshold: f64, // 0.3
    /// Bars walked by the quick backtest
    pub backtest_lookback: usize, // 30
    /// Default portfolio equity when the caller supplies none
    pub portfolio_equity: f64, // 1,000,000
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            max_risk_fraction: env::var("MAX_RISK_PCT")
                .unwrap_or_else(|_| "0.01".to_string())
                .parse()
                .context("MAX_RISK_PCT must be a number")?,
            atr_stop_multiplier: env::var("ATR_STOP_MULTIPLIER")
                .unwrap_or_else(|_| "1.5".to_string())
                .parse()
                .context("ATR_STOP_MULTIPLIER must be a number")?,
            min_reward_risk: env::var("MIN_REWARD_RISK")
                .unwrap_or_else(|_| "2.0".to_string())
                .parse()
                .context("MIN_REWARD_RISK must be a number")?,
            composite_threshold: env::var("COMPOSITE_THRESHOLD")
                .unwrap_or_else(|_| "0.3".to_string())
                .parse()
                .context("COMPOSITE_THRESHOLD must be a number")?,
            backtest_lookback: env::var("BACKTEST_LOOKBACK")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("BACKTEST_LOOKBACK must be an integer")?,
            portfolio_equity: env::var("PORTFOLIO_EQUITY")
                .unwrap_or_else(|_| "1000000".to_string())
                .parse()
                .context("PORTFOLIO_EQUITY must be a number")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.max_risk_fraction > 0.0 && self.max_risk_fraction < 1.0,
            "MAX_RISK_PCT must be in (0, 1), got {}",
            self.max_risk_fraction
        );
        anyhow::ensure!(
            self.atr_stop_multiplier > 0.0,
            "ATR_STOP_MULTIPLIER must be > 0"
        );
        anyhow::ensure!(self.min_reward_risk > 0.0, "MIN_REWARD_RISK must be > 0");
        anyhow::ensure!(
            self.backtest_lookback >= 2,
            "BACKTEST_LOOKBACK must be at least 2"
        );
        anyhow::ensure!(self.portfolio_equity > 0.0, "PORTFOLIO_EQUITY must be > 0");
        Ok(())
    }

    pub fn risk_config(&self) -> RiskConfig {
        RiskConfig {
            max_risk_fraction: self.max_risk_fraction,
            atr_stop_multiplier: self.atr_stop_multiplier,
            min_reward_risk: self.min_reward_risk,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_risk_fraction: 0.01,
            atr_stop_multiplier: 1.5,
            min_reward_risk: 2.0,
            composite_threshold: 0.3,
            backtest_lookback: 30,
            portfolio_equity: 1_000_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.risk_config().min_reward_risk, 2.0);
    }

    #[test]
    fn rejects_bad_risk_fraction() {
        let config = PipelineConfig {
            max_risk_fraction: 1.5,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
