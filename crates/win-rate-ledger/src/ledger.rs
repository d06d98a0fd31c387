use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use signal_core::round2;
use tracing::{debug, info};

use crate::models::{Outcome, PatternStats, SignalRecord, WinRateReport};

/// Records kept before the oldest is evicted.
const DEFAULT_CAPACITY: usize = 10_000;

/// Profit factor reported when the window has winners but no losers.
const NO_LOSS_PROFIT_FACTOR: f64 = 999.0;

/// Confidence cutoff splitting the correlation cohorts.
const HIGH_CONFIDENCE: f64 = 80.0;

/// Leaderboard entries reported.
const LEADERBOARD_SIZE: usize = 5;

/// Trading days used for the annualization factor.
const ANNUALIZATION_DAYS: f64 = 252.0;

struct Inner {
    records: HashMap<String, SignalRecord>,
    /// Insertion order by (timestamp, id), so the globally-oldest record
    /// is always the first element.
    index: BTreeSet<(i64, String)>,
}

/// Bounded in-memory store of signal outcomes.
///
/// Interior mutability behind a `Mutex` so a shared ledger can take
/// records, close-outs, and queries from multiple threads; record plus
/// eviction happens under one lock acquisition.
pub struct WinRateLedger {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl WinRateLedger {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WinRateLedger {
            inner: Mutex::new(Inner {
                records: HashMap::new(),
                index: BTreeSet::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace a record by id. Over capacity, the record with
    /// the oldest timestamp is dropped.
    pub fn record(&self, record: SignalRecord) {
        let mut inner = self.lock();
        let key = (record.timestamp.timestamp_millis(), record.id.clone());

        if let Some(previous) = inner.records.insert(record.id.clone(), record) {
            inner
                .index
                .remove(&(previous.timestamp.timestamp_millis(), previous.id));
        }
        inner.index.insert(key);

        if inner.records.len() > self.capacity {
            if let Some(oldest) = inner.index.iter().next().cloned() {
                inner.index.remove(&oldest);
                inner.records.remove(&oldest.1);
                debug!(id = %oldest.1, "evicted oldest signal record");
            }
        }
    }

    /// Fill in the exit side of a record. Unknown ids are ignored, and a
    /// repeated close-out overwrites the earlier exit fields.
    pub fn close_out(
        &self,
        id: &str,
        exit_price: f64,
        exit_time: DateTime<Utc>,
        notes: Option<String>,
    ) {
        let mut inner = self.lock();
        let Some(record) = inner.records.get_mut(id) else {
            debug!(id, "close_out for unknown signal id, ignoring");
            return;
        };

        let change = exit_price - record.entry_price;
        let outcome = Outcome::from_price_change(change);

        record.exit_price = Some(exit_price);
        record.exit_time = Some(exit_time);
        record.outcome = Some(outcome);
        record.profit_loss = Some(change);
        record.profit_loss_percent = Some(round2(change / record.entry_price * 100.0));
        record.notes = notes;

        info!(
            id,
            symbol = %record.symbol,
            outcome = ?outcome,
            pl_percent = record.profit_loss_percent,
            "closed signal"
        );
    }

    /// Roll up statistics over closed records whose signal was taken
    /// within the last `lookback_days` days. The window is keyed on the
    /// record's own timestamp, so a stale signal that only closed
    /// recently stays out. Open records never contribute.
    pub fn query(&self, lookback_days: i64) -> WinRateReport {
        let inner = self.lock();
        let cutoff = Utc::now() - Duration::days(lookback_days);

        let closed: Vec<&SignalRecord> = inner
            .records
            .values()
            .filter(|r| r.is_closed() && r.timestamp >= cutoff)
            .collect();

        if closed.is_empty() {
            return WinRateReport::empty();
        }

        let total = closed.len();
        let wins = closed
            .iter()
            .filter(|r| r.outcome == Some(Outcome::Win))
            .count();
        let losses = closed
            .iter()
            .filter(|r| r.outcome == Some(Outcome::Loss))
            .count();
        let breakevens = total - wins - losses;

        let win_percents: Vec<f64> = closed
            .iter()
            .filter(|r| r.outcome == Some(Outcome::Win))
            .filter_map(|r| r.profit_loss_percent)
            .collect();
        let loss_percents: Vec<f64> = closed
            .iter()
            .filter(|r| r.outcome == Some(Outcome::Loss))
            .filter_map(|r| r.profit_loss_percent)
            .map(f64::abs)
            .collect();

        let gross_win: f64 = win_percents.iter().sum();
        let gross_loss: f64 = loss_percents.iter().sum();

        let average_win = if win_percents.is_empty() {
            0.0
        } else {
            gross_win / win_percents.len() as f64
        };
        let average_loss = if loss_percents.is_empty() {
            0.0
        } else {
            gross_loss / loss_percents.len() as f64
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_win / gross_loss
        } else if gross_win > 0.0 {
            NO_LOSS_PROFIT_FACTOR
        } else {
            0.0
        };

        let p_win = wins as f64 / total as f64;
        let p_loss = losses as f64 / total as f64;
        let expectancy = p_win * average_win - p_loss * average_loss;

        WinRateReport {
            total_trades: total,
            wins,
            losses,
            breakevens,
            win_rate: round2(p_win * 100.0),
            average_win: round2(average_win),
            average_loss: round2(average_loss),
            profit_factor: round2(profit_factor),
            expectancy: round2(expectancy),
            sharpe_ratio: round2(sharpe_ratio(&closed)),
            pattern_leaderboard: pattern_leaderboard(&closed),
            confidence_correlation: round2(confidence_correlation(&closed)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.lock().records.values().filter(|r| !r.is_closed()).count()
    }

    pub fn closed_count(&self) -> usize {
        self.lock().records.values().filter(|r| r.is_closed()).count()
    }
}

impl Default for WinRateLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean over standard deviation of per-trade % returns, annualized by
/// √252 trading days. Fewer than two trades, or zero variance, reads 0.
fn sharpe_ratio(closed: &[&SignalRecord]) -> f64 {
    let returns: Vec<f64> = closed
        .iter()
        .filter_map(|r| r.profit_loss_percent)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    let std = variance.sqrt();
    if std == 0.0 {
        return 0.0;
    }

    mean / std * ANNUALIZATION_DAYS.sqrt()
}

fn pattern_leaderboard(closed: &[&SignalRecord]) -> Vec<PatternStats> {
    let mut by_pattern: HashMap<&str, (usize, usize)> = HashMap::new();
    for record in closed {
        if let Some(pattern) = record.pattern.as_deref() {
            let entry = by_pattern.entry(pattern).or_insert((0, 0));
            entry.0 += 1;
            if record.outcome == Some(Outcome::Win) {
                entry.1 += 1;
            }
        }
    }

    let mut stats: Vec<PatternStats> = by_pattern
        .into_iter()
        .map(|(pattern, (trades, wins))| PatternStats {
            pattern: pattern.to_string(),
            trades,
            wins,
            win_rate: round2(wins as f64 / trades as f64 * 100.0),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.win_rate
            .partial_cmp(&a.win_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.trades.cmp(&a.trades))
    });
    stats.truncate(LEADERBOARD_SIZE);
    stats
}

/// Win rate of the confidence ≥ 80 cohort minus the rest. Positive means
/// high-confidence calls actually win more often.
fn confidence_correlation(closed: &[&SignalRecord]) -> f64 {
    let cohort_rate = |records: &[&&SignalRecord]| -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        let wins = records
            .iter()
            .filter(|r| r.outcome == Some(Outcome::Win))
            .count();
        wins as f64 / records.len() as f64 * 100.0
    };

    let high: Vec<&&SignalRecord> = closed
        .iter()
        .filter(|r| r.confidence >= HIGH_CONFIDENCE)
        .collect();
    let low: Vec<&&SignalRecord> = closed
        .iter()
        .filter(|r| r.confidence < HIGH_CONFIDENCE)
        .collect();

    cohort_rate(&high) - cohort_rate(&low)
}
