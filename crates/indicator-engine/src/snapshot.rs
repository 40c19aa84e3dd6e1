use chrono::{DateTime, Utc};
use decision_core::{Candle, DecisionError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{annualized_volatility, atr, daily_returns, ema, macd, rsi, sma};

/// Minimum history for a full snapshot (longest window is the 200-bar SMA)
pub const MIN_CANDLES: usize = 200;

const RSI_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const MOMENTUM_PERIOD: usize = 20;

/// Point-in-time indicator readings for the most recent bar.
///
/// One snapshot corresponds to exactly one evaluation point; every call to
/// [`compute_snapshot`] recomputes from the full series, no state is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ticker: String,
    pub price: f64,
    pub rsi: f64,
    pub atr: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    /// close[last] / close[last-20] - 1
    pub momentum_20d: f64,
    /// (price - sma50) / sma50
    pub trend_strength: f64,
    /// Annualised stddev of daily returns (decimal)
    pub volatility: f64,
    /// Timestamp of the last candle used
    pub timestamp: DateTime<Utc>,
}

/// Validate the raw candle series before any math runs.
fn validate_candles(ticker: &str, candles: &[Candle]) -> Result<(), DecisionError> {
    if candles.len() < MIN_CANDLES {
        return Err(DecisionError::DataQuality(format!(
            "[{ticker}] insufficient history: {} candles, need {MIN_CANDLES}",
            candles.len()
        )));
    }

    for (i, c) in candles.iter().enumerate() {
        let fields = [
            ("open", c.open),
            ("high", c.high),
            ("low", c.low),
            ("close", c.close),
            ("volume", c.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(DecisionError::DataQuality(format!(
                    "[{ticker}] non-finite {name} at row {i}"
                )));
            }
        }
        if c.high < c.low {
            return Err(DecisionError::DataQuality(format!(
                "[{ticker}] high < low at row {i}"
            )));
        }
    }

    for (i, w) in candles.windows(2).enumerate() {
        if w[1].timestamp <= w[0].timestamp {
            return Err(DecisionError::DataQuality(format!(
                "[{ticker}] duplicate or out-of-order timestamp at row {}",
                i + 1
            )));
        }
    }

    Ok(())
}

/// Compute all indicators for the most recent bar of a validated series.
pub fn compute_snapshot(
    ticker: &str,
    candles: &[Candle],
) -> Result<IndicatorSnapshot, DecisionError> {
    validate_candles(ticker, candles)?;

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let n = closes.len();
    let price = closes[n - 1];

    let last = |series: Vec<f64>, name: &str| -> Result<f64, DecisionError> {
        series
            .last()
            .copied()
            .ok_or_else(|| DecisionError::Numeric(format!("[{ticker}] empty {name} series")))
    };

    let sma20 = last(sma(&closes, 20), "sma20")?;
    let sma50 = last(sma(&closes, 50), "sma50")?;
    let sma200 = last(sma(&closes, 200), "sma200")?;
    let ema20 = last(ema(&closes, 20), "ema20")?;
    let ema50 = last(ema(&closes, 50), "ema50")?;
    let rsi14 = last(rsi(&closes, RSI_PERIOD), "rsi")?;

    let atr14 = last(atr(candles, ATR_PERIOD), "atr")?;
    if atr14 <= 0.0 {
        return Err(DecisionError::DataQuality(format!(
            "[{ticker}] degenerate series: ATR is {atr14}"
        )));
    }

    let returns = daily_returns(&closes);
    let volatility = annualized_volatility(&returns);
    if volatility <= 0.0 {
        return Err(DecisionError::DataQuality(format!(
            "[{ticker}] degenerate series: zero return variance"
        )));
    }

    let momentum_20d = price / closes[n - 1 - MOMENTUM_PERIOD] - 1.0;
    let trend_strength = (price - sma50) / sma50;

    let macd_result = macd(&closes, 12, 26, 9);
    let macd_line = last(macd_result.macd_line, "macd_line")?;
    let macd_signal = last(macd_result.signal_line, "macd_signal")?;
    let macd_histogram = last(macd_result.histogram, "macd_histogram")?;

    let snapshot = IndicatorSnapshot {
        ticker: ticker.to_string(),
        price,
        rsi: rsi14,
        atr: atr14,
        sma20,
        sma50,
        sma200,
        ema20,
        ema50,
        macd_line,
        macd_signal,
        macd_histogram,
        momentum_20d,
        trend_strength,
        volatility,
        timestamp: candles[n - 1].timestamp,
    };

    let outputs = [
        ("price", snapshot.price),
        ("rsi", snapshot.rsi),
        ("atr", snapshot.atr),
        ("sma20", snapshot.sma20),
        ("sma50", snapshot.sma50),
        ("sma200", snapshot.sma200),
        ("ema20", snapshot.ema20),
        ("ema50", snapshot.ema50),
        ("macd_line", snapshot.macd_line),
        ("macd_signal", snapshot.macd_signal),
        ("macd_histogram", snapshot.macd_histogram),
        ("momentum_20d", snapshot.momentum_20d),
        ("trend_strength", snapshot.trend_strength),
        ("volatility", snapshot.volatility),
    ];
    for (name, value) in outputs {
        if !value.is_finite() {
            return Err(DecisionError::Numeric(format!(
                "[{ticker}] computed {name} is not finite: {value}"
            )));
        }
    }

    debug!(
        ticker,
        price = snapshot.price,
        rsi = snapshot.rsi,
        atr = snapshot.atr,
        "indicator snapshot computed"
    );

    Ok(snapshot)
}
