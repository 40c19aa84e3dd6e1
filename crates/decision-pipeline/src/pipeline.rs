use anyhow::Result;
use chrono::Utc;
use decision_core::{
    Candle, Scenario, SentimentSignal, StrategyResult, TradeOutcome, TradeRecord, ValidatedTrade,
};
use serde::Serialize;
use tracing::info;

use backtest_engine::score_strategies;
use indicator_engine::compute_snapshot;
use regime_classifier::{build_scenario, classify};
use risk_engine::{RiskEngine, TradeProposal};
use signal_strategies::{candidates_for, NO_TRADE};
use strategy_selector::select_strategy;
use trade_memory::{MemoryStats, TradeMemory};

use crate::config::PipelineConfig;

/// How a pipeline run resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    /// Trade accepted by the risk gate and recorded as open
    Opened,
    /// Selector chose the capital-preserving fallback
    NoTrade,
    /// Winning strategy produced no signal on the current bar
    NoSignal,
    /// Risk gate vetoed the proposal
    Killed,
}

/// Everything a presentation layer needs from one evaluation
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub ticker: String,
    pub scenario: Scenario,
    pub results: Vec<StrategyResult>,
    pub selected: String,
    pub status: DecisionStatus,
    pub reason: String,
    pub trade: Option<ValidatedTrade>,
    pub memory_stats: MemoryStats,
}

/// Runs the full decision chain for one ticker: indicators, regime, scenario,
/// candidate backtests, selection against memory, live signal, risk gate,
/// memory write.
///
/// The whole run is one synchronous call graph over in-memory data; the only
/// shared state is the injected trade memory, which serializes internally.
pub struct DecisionPipeline {
    config: PipelineConfig,
    memory: TradeMemory,
    risk: RiskEngine,
}

impl DecisionPipeline {
    pub fn new(config: PipelineConfig, memory: TradeMemory) -> Self {
        let risk = RiskEngine::new(config.risk_config());
        Self {
            config,
            memory,
            risk,
        }
    }

    pub fn memory(&self) -> &TradeMemory {
        &self.memory
    }

    pub fn run(
        &self,
        ticker: &str,
        candles: &[Candle],
        sentiment: &SentimentSignal,
        equity: f64,
    ) -> Result<PipelineOutcome> {
        info!(ticker, candles = candles.len(), "pipeline start");

        let snapshot = compute_snapshot(ticker, candles)?;
        let regime = classify(&snapshot)?;
        let scenario = build_scenario(regime, sentiment);
        info!(ticker, scenario = %scenario.label, "scenario built");

        let candidates = candidates_for(&scenario);
        let mut results = score_strategies(&candidates, candles, self.config.backtest_lookback);

        let selected = select_strategy(
            &mut results,
            &self.memory,
            &scenario,
            self.config.composite_threshold,
        );

        if selected.name == NO_TRADE {
            return Ok(self.outcome(
                ticker,
                scenario,
                results,
                selected.name,
                DecisionStatus::NoTrade,
                "no strategy above threshold, preserving capital".to_string(),
                None,
            ));
        }

        let Some(generator) = candidates.iter().find(|g| g.name() == selected.name) else {
            anyhow::bail!("selected strategy '{}' missing from candidates", selected.name);
        };

        let Some(signal) = generator.evaluate(candles) else {
            return Ok(self.outcome(
                ticker,
                scenario,
                results,
                selected.name.clone(),
                DecisionStatus::NoSignal,
                format!("strategy '{}' produced no signal on the current bar", selected.name),
                None,
            ));
        };

        // The generator's stop and target are advisory: the gate recomputes
        // its own ATR stop and builds the 2R target from it.
        let proposal = TradeProposal {
            ticker: ticker.to_string(),
            action: signal.direction.into(),
            entry: signal.entry,
            target: None,
            conviction_score: selected.composite_score.clamp(0.0, 1.0),
            regime,
            sentiment_score: Some(sentiment.score),
        };

        let validated = self.risk.apply_limits(&proposal, snapshot.atr, equity)?;

        if validated.killed {
            let reason = validated
                .kill_reason
                .clone()
                .unwrap_or_else(|| "killed by risk gate".to_string());
            return Ok(self.outcome(
                ticker,
                scenario,
                results,
                selected.name,
                DecisionStatus::Killed,
                reason,
                Some(validated),
            ));
        }

        self.memory.record_open(TradeRecord {
            scenario_label: scenario.label.clone(),
            strategy_name: selected.name.clone(),
            regime_trend: regime.label().to_string(),
            news_bucket: sentiment.bucket.label().to_string(),
            ticker: ticker.to_string(),
            entry: validated.entry_price,
            stop: validated.stop_loss,
            target: validated.target_price,
            size: validated.position_size,
            risk_per_share: validated.risk_per_share,
            rr_ratio: validated.risk_reward_ratio,
            outcome: TradeOutcome::Open,
            pnl_pct: 0.0,
            exit_price: None,
            opened_at: Utc::now(),
            closed_at: None,
        })?;

        let reason = format!(
            "{} {} qty={} entry={:.2} stop={:.2} target={:.2}",
            validated.action,
            ticker,
            validated.position_size,
            validated.entry_price,
            validated.stop_loss,
            validated.target_price
        );

        Ok(self.outcome(
            ticker,
            scenario,
            results,
            selected.name,
            DecisionStatus::Opened,
            reason,
            Some(validated),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn outcome(
        &self,
        ticker: &str,
        scenario: Scenario,
        results: Vec<StrategyResult>,
        selected: String,
        status: DecisionStatus,
        reason: String,
        trade: Option<ValidatedTrade>,
    ) -> PipelineOutcome {
        info!(ticker, ?status, reason = %reason, "pipeline end");
        PipelineOutcome {
            ticker: ticker.to_string(),
            scenario,
            results,
            selected,
            status,
            reason,
            trade,
            memory_stats: self.memory.stats(),
        }
    }
}
