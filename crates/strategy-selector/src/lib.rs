use decision_core::{Scenario, StrategyResult};
use signal_strategies::NO_TRADE;
use trade_memory::TradeMemory;
use tracing::info;

/// Composite scores below this select no-trade regardless of ranking
pub const COMPOSITE_THRESHOLD: f64 = 0.3;

fn composite_of(result: &StrategyResult) -> f64 {
    let avg_return_scaled = (result.avg_return * 100.0).clamp(0.0, 1.0);

    0.4 * result.sharpe + 0.3 * result.win_rate + 0.2 * avg_return_scaled
        - 0.1 * result.max_drawdown
}

/// Pick the best strategy from backtest results plus memory bias.
///
/// Fills `composite_score` on every result in place. A danger scenario, a
/// NoTrade winner, or a best score under `threshold` all resolve to the
/// zero-valued no-trade result, the system's only weak-edge safeguard.
pub fn select_strategy(
    results: &mut [StrategyResult],
    memory: &TradeMemory,
    scenario: &Scenario,
    threshold: f64,
) -> StrategyResult {
    if scenario.is_danger() {
        info!(scenario = %scenario.label, "danger scenario, forcing no-trade");
        return StrategyResult::zero(NO_TRADE);
    }

    for result in results.iter_mut() {
        if result.name == NO_TRADE {
            result.composite_score = 0.0;
            continue;
        }

        let bias = memory.bias_for(&scenario.label, &result.name);
        result.composite_score = composite_of(result) * bias;
    }

    let best = results
        .iter()
        .max_by(|a, b| a.composite_score.total_cmp(&b.composite_score));

    let Some(best) = best else {
        return StrategyResult::zero(NO_TRADE);
    };

    if best.name == NO_TRADE || best.composite_score < threshold {
        info!(
            scenario = %scenario.label,
            best = %best.name,
            score = best.composite_score,
            threshold,
            "no strategy above threshold, selecting no-trade"
        );
        return StrategyResult::zero(NO_TRADE);
    }

    info!(
        scenario = %scenario.label,
        selected = %best.name,
        score = best.composite_score,
        "strategy selected"
    );

    best.clone()
}
