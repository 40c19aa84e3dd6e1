use decision_core::{DecisionError, Regime, Scenario, SentimentBucket, SentimentSignal};
use indicator_engine::IndicatorSnapshot;
use tracing::info;

/// Classify the market regime from an indicator snapshot.
///
/// Rules, evaluated in order, no probabilities, no smoothing:
/// - BULL: price > sma50 > sma200 and trend_strength > 0
/// - BEAR: price < sma50 < sma200 and trend_strength < 0
/// - NEUTRAL: everything else
pub fn classify(snapshot: &IndicatorSnapshot) -> Result<Regime, DecisionError> {
    validate_snapshot(snapshot)?;

    let price = snapshot.price;
    let sma50 = snapshot.sma50;
    let sma200 = snapshot.sma200;
    let trend = snapshot.trend_strength;

    let regime = if price > sma50 && sma50 > sma200 && trend > 0.0 {
        Regime::Bull
    } else if price < sma50 && sma50 < sma200 && trend < 0.0 {
        Regime::Bear
    } else {
        Regime::Neutral
    };

    info!(
        ticker = %snapshot.ticker,
        %regime,
        price,
        sma50,
        sma200,
        trend_strength = trend,
        "regime classified"
    );

    Ok(regime)
}

fn validate_snapshot(snapshot: &IndicatorSnapshot) -> Result<(), DecisionError> {
    let positive_fields = [
        ("price", snapshot.price),
        ("sma50", snapshot.sma50),
        ("sma200", snapshot.sma200),
    ];
    for (name, value) in positive_fields {
        if !value.is_finite() || value <= 0.0 {
            return Err(DecisionError::InvalidInput(format!(
                "[{}] {name} must be finite and > 0, got {value}",
                snapshot.ticker
            )));
        }
    }

    if !snapshot.trend_strength.is_finite() {
        return Err(DecisionError::InvalidInput(format!(
            "[{}] trend_strength must be finite, got {}",
            snapshot.ticker, snapshot.trend_strength
        )));
    }

    Ok(())
}

/// Fixed lookup table covering all 9 regime x bucket combinations.
///
/// The fallback concatenation should be unreachable given the closed enums,
/// but keeps the label total.
fn base_label(regime: Regime, bucket: SentimentBucket) -> String {
    let table = [
        ((Regime::Bull, SentimentBucket::Positive), "bull_positive"),
        ((Regime::Bull, SentimentBucket::Neutral), "bull_neutral"),
        ((Regime::Bull, SentimentBucket::Negative), "bull_negative"),
        ((Regime::Neutral, SentimentBucket::Positive), "neutral_positive"),
        ((Regime::Neutral, SentimentBucket::Neutral), "neutral_neutral"),
        ((Regime::Neutral, SentimentBucket::Negative), "neutral_negative"),
        ((Regime::Bear, SentimentBucket::Positive), "bear_positive"),
        ((Regime::Bear, SentimentBucket::Neutral), "bear_neutral"),
        ((Regime::Bear, SentimentBucket::Negative), "bear_negative"),
    ];

    table
        .iter()
        .find(|((r, b), _)| *r == regime && *b == bucket)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| format!("{}_{}", regime.label(), bucket.label()))
}

/// Build the scenario key from regime and sentiment.
///
/// The label is the sole key used for memory lookups, so the same (regime,
/// sentiment) pair must always reproduce the same text. A `_danger` suffix is
/// appended when the sentiment danger flag is set.
pub fn build_scenario(regime: Regime, sentiment: &SentimentSignal) -> Scenario {
    let base = base_label(regime, sentiment.bucket);
    let label = if sentiment.danger {
        format!("{base}_danger")
    } else {
        base
    };

    Scenario {
        label,
        regime,
        sentiment: *sentiment,
    }
}
