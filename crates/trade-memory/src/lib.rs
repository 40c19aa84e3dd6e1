use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use decision_core::{DecisionError, TradeOutcome, TradeRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Fewer closed records than this and the bias stays neutral
const MIN_CLOSED_FOR_BIAS: usize = 3;

/// Summary statistics over the whole store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_trades: usize,
    pub open: usize,
    pub closed: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_pnl_pct: f64,
}

struct Inner {
    records: Vec<TradeRecord>,
    path: Option<PathBuf>,
}

/// Append-only trade outcome store keyed by (scenario label, strategy name).
///
/// All reads and writes serialize on one mutex so a bias read can never race
/// a concurrent outcome update. Persistence is a JSON file rewritten on every
/// mutation; a missing or corrupt file starts an empty store rather than
/// failing.
pub struct TradeMemory {
    inner: Mutex<Inner>,
}

impl TradeMemory {
    /// Store without a backing file, for tests and one-shot evaluations.
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: Vec::new(),
                path: None,
            }),
        }
    }

    /// Open a file-backed store, loading any previously persisted records.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<TradeRecord>>(&bytes) {
                Ok(records) => records,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt trade memory file, starting empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        info!(path = %path.display(), records = records.len(), "trade memory opened");

        Self {
            inner: Mutex::new(Inner {
                records,
                path: Some(path),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save(inner: &Inner) -> Result<(), DecisionError> {
        let Some(path) = &inner.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(&inner.records)
            .map_err(|e| DecisionError::Store(format!("serialize trade memory: {e}")))?;
        fs::write(path, bytes)
            .map_err(|e| DecisionError::Store(format!("write {}: {e}", path.display())))?;
        Ok(())
    }

    /// Append a newly opened trade.
    pub fn record_open(&self, record: TradeRecord) -> Result<(), DecisionError> {
        let mut inner = self.lock();
        info!(
            ticker = %record.ticker,
            scenario = %record.scenario_label,
            strategy = %record.strategy_name,
            size = record.size,
            "trade opened"
        );
        inner.records.push(record);
        Self::save(&inner)
    }

    /// Close the most recent open trade for `ticker`, mutating it in place.
    ///
    /// Returns the updated record, or `None` when no open trade exists for
    /// the ticker: a normal not-found result, never an error and never a new
    /// record.
    pub fn record_outcome(
        &self,
        ticker: &str,
        exit_price: f64,
        outcome: TradeOutcome,
        pnl_pct: f64,
        closed_at: DateTime<Utc>,
    ) -> Result<Option<TradeRecord>, DecisionError> {
        if !outcome.is_closed() {
            return Err(DecisionError::InvalidInput(format!(
                "outcome for {ticker} must be win/loss/scratch, got open"
            )));
        }

        let mut inner = self.lock();

        let Some(record) = inner
            .records
            .iter_mut()
            .rev()
            .find(|r| r.ticker == ticker && r.outcome == TradeOutcome::Open)
        else {
            return Ok(None);
        };

        record.exit_price = Some(exit_price);
        record.outcome = outcome;
        record.pnl_pct = pnl_pct;
        record.closed_at = Some(closed_at);
        let updated = record.clone();

        info!(ticker, ?outcome, pnl_pct, "trade outcome recorded");

        Self::save(&inner)?;
        Ok(Some(updated))
    }

    /// All past trades with the same scenario + strategy combination.
    pub fn similar(&self, scenario_label: &str, strategy_name: &str) -> Vec<TradeRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.scenario_label == scenario_label && r.strategy_name == strategy_name)
            .cloned()
            .collect()
    }

    /// Multiplier in [0.5, 1.5] from the historical win rate of this
    /// scenario + strategy pairing.
    ///
    /// - fewer than 3 closed trades -> 1.0 (neutral)
    /// - win rate >= 0.7            -> 1.5
    /// - 0.5 <= win rate < 0.7      -> 1.0 + (wr - 0.5) * 2.0
    /// - otherwise                  -> max(0.5, wr)
    pub fn bias_for(&self, scenario_label: &str, strategy_name: &str) -> f64 {
        let inner = self.lock();
        let closed: Vec<&TradeRecord> = inner
            .records
            .iter()
            .filter(|r| {
                r.scenario_label == scenario_label
                    && r.strategy_name == strategy_name
                    && r.outcome.is_closed()
            })
            .collect();

        if closed.len() < MIN_CLOSED_FOR_BIAS {
            return 1.0;
        }

        let wins = closed
            .iter()
            .filter(|r| r.outcome == TradeOutcome::Win)
            .count();
        let win_rate = wins as f64 / closed.len() as f64;

        if win_rate >= 0.7 {
            1.5
        } else if win_rate >= 0.5 {
            1.0 + (win_rate - 0.5) * 2.0
        } else {
            win_rate.max(0.5)
        }
    }

    pub fn stats(&self) -> MemoryStats {
        let inner = self.lock();
        let total = inner.records.len();
        let closed: Vec<&TradeRecord> = inner
            .records
            .iter()
            .filter(|r| r.outcome.is_closed())
            .collect();
        let wins = closed
            .iter()
            .filter(|r| r.outcome == TradeOutcome::Win)
            .count();
        let losses = closed
            .iter()
            .filter(|r| r.outcome == TradeOutcome::Loss)
            .count();

        let (win_rate, avg_pnl_pct) = if closed.is_empty() {
            (0.0, 0.0)
        } else {
            (
                wins as f64 / closed.len() as f64,
                closed.iter().map(|r| r.pnl_pct).sum::<f64>() / closed.len() as f64,
            )
        };

        MemoryStats {
            total_trades: total,
            open: total - closed.len(),
            closed: closed.len(),
            wins,
            losses,
            win_rate,
            avg_pnl_pct,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
