use chrono::{Duration, TimeZone, Utc};
use decision_core::{Candle, TradeAction};
use decision_pipeline::{DecisionPipeline, DecisionStatus, PipelineConfig};
use sentiment_scorer::score_headlines;
use trade_memory::TradeMemory;

/// Relentless uptrend: every bar breaks the prior 20-bar high on expanding
/// volume, so the breakout strategy both scores well and fires live.
fn breakout_market(count: usize) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let close = 100.0 + i as f64;
            Candle {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1_000_000.0 * 1.03_f64.powi(i as i32),
            }
        })
        .collect()
}

fn bullish_headlines() -> Vec<String> {
    vec![
        "Shares surge on record earnings beat".to_string(),
        "Brokerages upgrade on strong growth".to_string(),
    ]
}

#[test]
fn full_chain_opens_a_trade_in_a_breakout_market() {
    let pipeline = DecisionPipeline::new(PipelineConfig::default(), TradeMemory::in_memory());
    let candles = breakout_market(260);
    let sentiment = score_headlines(&bullish_headlines());

    let outcome = pipeline
        .run("DEMO.NS", &candles, &sentiment, 1_000_000.0)
        .unwrap();

    assert_eq!(outcome.scenario.label, "bull_positive");
    assert_eq!(outcome.selected, "breakout");
    assert_eq!(outcome.status, DecisionStatus::Opened);

    let trade = outcome.trade.unwrap();
    assert!(!trade.killed);
    assert_eq!(trade.action, TradeAction::Buy);
    assert!(trade.position_size >= 1);
    assert!(trade.stop_loss < trade.entry_price);
    assert!(trade.risk_reward_ratio + 1e-6 >= 2.0);
    assert!(trade.total_risk <= 1_000_000.0 * 0.01 + 1e-9);

    // The open is recorded for the learning loop
    assert_eq!(outcome.memory_stats.total_trades, 1);
    assert_eq!(outcome.memory_stats.open, 1);
}

#[test]
fn danger_headlines_force_no_trade() {
    let pipeline = DecisionPipeline::new(PipelineConfig::default(), TradeMemory::in_memory());
    let candles = breakout_market(260);
    let sentiment = score_headlines(&[
        "Trading halt amid crisis and crash fears".to_string(),
        "Shares surge on record earnings beat".to_string(),
    ]);

    assert!(sentiment.danger);

    let outcome = pipeline
        .run("DEMO.NS", &candles, &sentiment, 1_000_000.0)
        .unwrap();

    assert!(outcome.scenario.label.ends_with("_danger"));
    assert_eq!(outcome.selected, "no_trade");
    assert_eq!(outcome.status, DecisionStatus::NoTrade);
    assert!(outcome.trade.is_none());
    assert_eq!(outcome.memory_stats.total_trades, 0);
}

#[test]
fn quiet_final_bar_is_no_signal() {
    let pipeline = DecisionPipeline::new(PipelineConfig::default(), TradeMemory::in_memory());
    let mut candles = breakout_market(260);
    // Volume dries up on the last bar: the walk window still scores the
    // breakout, but the live evaluation finds no confirmation.
    let prior_volume = candles[258].volume;
    candles.last_mut().unwrap().volume = prior_volume * 0.5;

    let sentiment = score_headlines(&bullish_headlines());
    let outcome = pipeline
        .run("DEMO.NS", &candles, &sentiment, 1_000_000.0)
        .unwrap();

    assert_eq!(outcome.selected, "breakout");
    assert_eq!(outcome.status, DecisionStatus::NoSignal);
    assert!(outcome.trade.is_none());
    assert_eq!(outcome.memory_stats.total_trades, 0);
}

#[test]
fn short_history_is_a_data_quality_error() {
    let pipeline = DecisionPipeline::new(PipelineConfig::default(), TradeMemory::in_memory());
    let candles = breakout_market(120);
    let sentiment = score_headlines(&bullish_headlines());

    let result = pipeline.run("DEMO.NS", &candles, &sentiment, 1_000_000.0);
    assert!(result.is_err());
}

#[test]
fn outcome_serializes_for_presentation_layers() {
    let pipeline = DecisionPipeline::new(PipelineConfig::default(), TradeMemory::in_memory());
    let candles = breakout_market(260);
    let sentiment = score_headlines(&bullish_headlines());

    let outcome = pipeline
        .run("DEMO.NS", &candles, &sentiment, 1_000_000.0)
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "opened");
    assert_eq!(json["scenario"]["label"], "bull_positive");
    assert!(json["results"].as_array().unwrap().len() >= 2);
}
