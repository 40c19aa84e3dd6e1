use anyhow::Result;
use chrono::{Duration, Utc};
use decision_core::Candle;
use decision_pipeline::{DecisionPipeline, PipelineConfig};
use sentiment_scorer::score_headlines;
use trade_memory::TradeMemory;

/// Deterministic trending series standing in for a market data feed.
fn demo_candles(count: usize) -> Vec<Candle> {
    let start = Utc::now() - Duration::days(count as i64);
    (0..count)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.4 + (i as f64 * 0.6).sin() * 3.0;
            let expanding = 1_000_000.0 * (1.0 + (i as f64 * 0.25).cos().abs());
            Candle {
                timestamp: start + Duration::days(i as i64),
                open: base,
                high: base + 2.0,
                low: base - 2.0,
                close: base + 0.8,
                volume: expanding,
            }
        })
        .collect()
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = PipelineConfig::from_env()?;
    tracing::info!("configuration loaded");
    tracing::info!("  risk per trade: {:.1}%", config.max_risk_fraction * 100.0);
    tracing::info!("  stop distance: {} x ATR", config.atr_stop_multiplier);
    tracing::info!("  minimum reward:risk: {}", config.min_reward_risk);

    let memory_path =
        std::env::var("TRADE_MEMORY_PATH").unwrap_or_else(|_| "trade_memory.json".to_string());
    let memory = TradeMemory::open(memory_path);

    let equity = config.portfolio_equity;
    let pipeline = DecisionPipeline::new(config, memory);

    let candles = demo_candles(260);
    let headlines = vec![
        "Shares rally on record earnings beat".to_string(),
        "Brokerages upgrade on strong revenue growth".to_string(),
        "Order book expansion drives optimistic guidance".to_string(),
    ];
    let sentiment = score_headlines(&headlines);

    let outcome = pipeline.run("DEMO.NS", &candles, &sentiment, equity)?;

    tracing::info!(
        scenario = %outcome.scenario.label,
        selected = %outcome.selected,
        status = ?outcome.status,
        reason = %outcome.reason,
        "pipeline finished"
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
