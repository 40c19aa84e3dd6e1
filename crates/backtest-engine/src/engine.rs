use decision_core::{Candle, StrategyResult, TradeDirection};
use rayon::prelude::*;
use signal_strategies::SignalGenerator;
use statrs::statistics::Statistics;
use tracing::debug;

/// Number of recent bars walked by default
pub const DEFAULT_LOOKBACK: usize = 30;

/// Extra history required beyond the walk window so generators have context
const CONTEXT_BARS: usize = 20;

/// Stdev floor for the sharpe denominator
const STDEV_EPSILON: f64 = 1e-9;

const TRADING_DAYS: f64 = 252.0;

/// Walk-forward backtest of a single generator over the trailing window.
///
/// For each of the last `lookback` bars the generator sees only the series
/// truncated at that bar, and the outcome is settled on the following bar:
/// stop first (conservative), then target, else mark-to-close. Too little
/// history is a normal zero-score condition, not an error.
pub fn backtest_strategy(
    strategy: &dyn SignalGenerator,
    candles: &[Candle],
    lookback: usize,
) -> StrategyResult {
    let n = candles.len();
    if lookback < 2 || n < lookback + CONTEXT_BARS {
        return StrategyResult::zero(strategy.name());
    }

    let mut returns: Vec<f64> = Vec::with_capacity(lookback - 1);
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_drawdown = 0.0_f64;

    for i in (n - lookback)..(n - 1) {
        // The generator must never see bars past i
        let window = &candles[..=i];
        let Some(signal) = strategy.evaluate(window) else {
            returns.push(0.0);
            continue;
        };

        let next = &candles[i + 1];
        let entry = signal.entry;

        let ret = match signal.direction {
            TradeDirection::Buy => {
                let risk = entry - signal.stop;
                if risk <= 0.0 {
                    returns.push(0.0);
                    continue;
                }
                if next.low <= signal.stop {
                    -risk / entry
                } else if next.high >= signal.target {
                    (signal.target - entry) / entry
                } else {
                    (next.close - entry) / entry
                }
            }
            TradeDirection::Sell => {
                let risk = signal.stop - entry;
                if risk <= 0.0 {
                    returns.push(0.0);
                    continue;
                }
                if next.high >= signal.stop {
                    -risk / entry
                } else if next.low <= signal.target {
                    (entry - signal.target) / entry
                } else {
                    (entry - next.close) / entry
                }
            }
        };

        returns.push(ret);

        equity *= 1.0 + ret;
        peak = peak.max(equity);
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - equity) / peak);
        }
    }

    let active: Vec<f64> = returns.iter().copied().filter(|r| *r != 0.0).collect();
    if active.is_empty() {
        return StrategyResult::zero(strategy.name());
    }

    let wins = active.iter().filter(|r| **r > 0.0).count();
    let win_rate = wins as f64 / active.len() as f64;
    let avg_return = active.iter().mean();

    // Sharpe over the full series, zeros included
    let mean_all = returns.iter().mean();
    let std_all = returns.iter().population_std_dev().max(STDEV_EPSILON);
    let sharpe = mean_all / std_all * TRADING_DAYS.sqrt();

    debug!(
        strategy = strategy.name(),
        active = active.len(),
        win_rate,
        avg_return,
        max_drawdown,
        sharpe,
        "walk-forward scored"
    );

    StrategyResult {
        name: strategy.name().to_string(),
        win_rate,
        avg_return,
        max_drawdown,
        sharpe,
        composite_score: 0.0,
    }
}

/// Score every candidate generator over the same window, input order
/// preserved. Generators are independent, so the fan-out is parallel.
pub fn score_strategies(
    strategies: &[Box<dyn SignalGenerator>],
    candles: &[Candle],
    lookback: usize,
) -> Vec<StrategyResult> {
    strategies
        .par_iter()
        .map(|s| backtest_strategy(s.as_ref(), candles, lookback))
        .collect()
}
