use decision_core::{Candle, SignalProposal, TradeDirection};
use indicator_engine::{atr, ema, rsi};
use tracing::debug;

use crate::SignalGenerator;

const ATR_PERIOD: usize = 14;
const RSI_PERIOD: usize = 14;
const RSI_OVERSOLD: f64 = 30.0;
const VOLUME_CONFIRMATION: f64 = 1.2;

/// ATR at the latest bar, or `None` when the window is short or the range is
/// degenerate. Every generator builds its stop from this.
fn latest_risk(candles: &[Candle]) -> Option<f64> {
    let risk = *atr(candles, ATR_PERIOD).last()?;
    if risk > 0.0 {
        Some(risk)
    } else {
        None
    }
}

/// Buy when the close breaks above the prior 20-bar high on expanding volume.
///
/// Stop is one ATR below entry, target two ATR above: R:R fixed at 2.0 by
/// construction.
pub struct BreakoutStrategy;

impl SignalGenerator for BreakoutStrategy {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn evaluate(&self, candles: &[Candle]) -> Option<SignalProposal> {
        if candles.len() < 21 {
            return None;
        }

        let n = candles.len();
        let current = &candles[n - 1];
        let window = &candles[n - 21..n - 1];

        let prior_high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let avg_volume = window.iter().map(|c| c.volume).sum::<f64>() / window.len() as f64;

        if current.close <= prior_high {
            return None;
        }
        if current.volume <= avg_volume * VOLUME_CONFIRMATION {
            return None;
        }

        let risk = latest_risk(candles)?;
        let entry = current.close;

        debug!(entry, risk, prior_high, "breakout triggered");

        Some(SignalProposal {
            entry,
            stop: entry - risk,
            target: entry + 2.0 * risk,
            direction: TradeDirection::Buy,
        })
    }
}

/// Buy oversold bounces: RSI(14) below 30.
pub struct MeanReversionStrategy;

impl SignalGenerator for MeanReversionStrategy {
    fn name(&self) -> &'static str {
        "mean_reversion"
    }

    fn evaluate(&self, candles: &[Candle]) -> Option<SignalProposal> {
        if candles.len() < 30 {
            return None;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let current_rsi = *rsi(&closes, RSI_PERIOD).last()?;

        if current_rsi >= RSI_OVERSOLD {
            return None;
        }

        let risk = latest_risk(candles)?;
        let entry = *closes.last()?;

        debug!(entry, risk, rsi = current_rsi, "mean reversion triggered");

        Some(SignalProposal {
            entry,
            stop: entry - risk,
            target: entry + 2.0 * risk,
            direction: TradeDirection::Buy,
        })
    }
}

/// Short continuation in bearish momentum: close below EMA(20) below EMA(50).
/// The stop sits ABOVE entry for the short side.
pub struct MomentumStrategy;

impl SignalGenerator for MomentumStrategy {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn evaluate(&self, candles: &[Candle]) -> Option<SignalProposal> {
        if candles.len() < 50 {
            return None;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let ema20 = *ema(&closes, 20).last()?;
        let ema50 = *ema(&closes, 50).last()?;
        let entry = *closes.last()?;

        if entry >= ema20 || ema20 >= ema50 {
            return None;
        }

        let risk = latest_risk(candles)?;

        debug!(entry, risk, ema20, ema50, "momentum short triggered");

        Some(SignalProposal {
            entry,
            stop: entry + risk,
            target: entry - 2.0 * risk,
            direction: TradeDirection::Sell,
        })
    }
}

/// Always returns `None`; preserves capital when no edge exists.
pub struct NoTradeStrategy;

impl SignalGenerator for NoTradeStrategy {
    fn name(&self) -> &'static str {
        crate::NO_TRADE
    }

    fn evaluate(&self, _candles: &[Candle]) -> Option<SignalProposal> {
        None
    }
}
