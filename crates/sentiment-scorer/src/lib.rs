use std::collections::HashSet;

use decision_core::{SentimentBucket, SentimentSignal};
use tracing::debug;

const POSITIVE_WORDS: &[&str] = &[
    "upgrade", "buy", "outperform", "beat", "profit", "growth", "surge",
    "rally", "bullish", "record", "strong", "gain", "jumps", "soars",
    "rises", "dividend", "expansion", "acquisition", "optimistic", "boost",
    "recovery", "earnings", "revenue", "ipo", "approval",
];

const NEGATIVE_WORDS: &[&str] = &[
    "downgrade", "sell", "underperform", "miss", "loss", "decline", "crash",
    "bearish", "weak", "fall", "drops", "sinks", "cut", "warning", "risk",
    "investigation", "fraud", "default", "layoff", "shutdown", "bankruptcy",
    "debt", "lawsuit", "penalty", "probe", "scandal", "recession",
];

const DANGER_WORDS: &[&str] = &[
    "crisis", "crash", "halt", "ban", "emergency", "collapse", "default",
    "bankrupt", "fraud", "scam", "seized", "suspended", "delisted",
];

/// Bucket boundary: avg score >= +0.2 is positive, <= -0.2 is negative
const BUCKET_THRESHOLD: f64 = 0.2;

/// An average score at or below this trips the danger flag on its own
const DANGER_SCORE_FLOOR: f64 = -0.6;

fn words_of(headline: &str) -> HashSet<String> {
    let mut words = HashSet::new();
    let mut current = String::new();
    for ch in headline.chars() {
        if ch.is_ascii_alphabetic() {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            words.insert(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.insert(current);
    }
    words
}

fn score_headline(headline: &str) -> f64 {
    let words = words_of(headline);
    let pos = POSITIVE_WORDS.iter().filter(|w| words.contains(**w)).count();
    let neg = NEGATIVE_WORDS.iter().filter(|w| words.contains(**w)).count();
    let total = pos + neg;
    if total > 0 {
        (pos as f64 - neg as f64) / total as f64
    } else {
        0.0
    }
}

fn has_danger(headline: &str) -> bool {
    let words = words_of(headline);
    DANGER_WORDS.iter().any(|w| words.contains(*w))
}

/// Score a batch of headlines into a sentiment signal.
///
/// Keyword scoring only; an empty headline list is a neutral reading, not an
/// error.
pub fn score_headlines(headlines: &[String]) -> SentimentSignal {
    if headlines.is_empty() {
        return SentimentSignal::neutral();
    }

    let scores: Vec<f64> = headlines.iter().map(|h| score_headline(h)).collect();
    let avg_score = scores.iter().sum::<f64>() / scores.len() as f64;

    let bucket = if avg_score >= BUCKET_THRESHOLD {
        SentimentBucket::Positive
    } else if avg_score <= -BUCKET_THRESHOLD {
        SentimentBucket::Negative
    } else {
        SentimentBucket::Neutral
    };

    let danger = headlines.iter().any(|h| has_danger(h)) || avg_score <= DANGER_SCORE_FLOOR;

    debug!(
        headline_count = headlines.len(),
        avg_score,
        bucket = bucket.label(),
        danger,
        "headlines scored"
    );

    SentimentSignal {
        score: avg_score,
        bucket,
        danger,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_headlines_are_neutral() {
        let signal = score_headlines(&[]);
        assert_eq!(signal.score, 0.0);
        assert_eq!(signal.bucket, SentimentBucket::Neutral);
        assert!(!signal.danger);
    }

    #[test]
    fn positive_headlines_bucket_positive() {
        let signal = score_headlines(&lines(&[
            "Shares surge on record earnings beat",
            "Analysts upgrade on strong revenue growth",
        ]));
        assert_eq!(signal.bucket, SentimentBucket::Positive);
        assert!(signal.score > 0.0);
        assert!(!signal.danger);
    }

    #[test]
    fn negative_headlines_bucket_negative() {
        let signal = score_headlines(&lines(&[
            "Profit warning as sales decline",
            "Analysts downgrade after earnings miss",
        ]));
        assert_eq!(signal.bucket, SentimentBucket::Negative);
        assert!(signal.score < 0.0);
    }

    #[test]
    fn danger_keyword_sets_flag() {
        let signal = score_headlines(&lines(&["Trading halt after fraud investigation"]));
        assert!(signal.danger);
    }

    #[test]
    fn extreme_negative_score_sets_flag() {
        // Every headline purely negative: avg score -1.0 <= -0.6
        let signal = score_headlines(&lines(&[
            "Massive loss and decline",
            "Weak outlook, warning issued",
        ]));
        assert!(signal.danger);
        assert_eq!(signal.bucket, SentimentBucket::Negative);
    }

    #[test]
    fn mixed_headlines_stay_neutral() {
        let signal = score_headlines(&lines(&["Earnings beat but weak guidance cut"]));
        assert_eq!(signal.bucket, SentimentBucket::Neutral);
    }

    #[test]
    fn punctuation_does_not_break_tokens() {
        let signal = score_headlines(&lines(&["Q3: record-earnings, strong growth!"]));
        assert!(signal.score > 0.0);
    }
}
