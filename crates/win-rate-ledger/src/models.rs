use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{Recommendation, SignalBias};

/// Price-change deadband inside which a closed trade counts as breakeven.
pub const BREAKEVEN_DEADBAND: f64 = 0.01;

/// Outcome of a closed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    /// Classify from the absolute price move between entry and exit.
    pub fn from_price_change(change: f64) -> Self {
        if change > BREAKEVEN_DEADBAND {
            Outcome::Win
        } else if change < -BREAKEVEN_DEADBAND {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        }
    }
}

/// One tracked signal, open until `close_out` fills the exit fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub signal_type: Recommendation,
    pub confidence: f64,
    pub confluence_percent: f64,
    pub pattern: Option<String>,
    pub adx: f64,
    pub rsi: f64,
    pub macd_bias: SignalBias,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    pub outcome: Option<Outcome>,
    pub profit_loss: Option<f64>,
    pub profit_loss_percent: Option<f64>,
    pub notes: Option<String>,
}

impl SignalRecord {
    pub fn is_closed(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Per-pattern rollup in the leaderboard.
///
/// No minimum sample count is enforced, so a pattern with a single winning
/// trade shows a 100% win rate. Read the `trades` count alongside the rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternStats {
    pub pattern: String,
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
}

/// Aggregate statistics over closed signals inside a lookback window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinRateReport {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakevens: usize,
    pub win_rate: f64,
    /// Mean gain of winners, in percent
    pub average_win: f64,
    /// Mean loss of losers, in percent, reported as a positive magnitude
    pub average_loss: f64,
    /// Gross win% over gross loss%; 999.0 when there are no losers
    pub profit_factor: f64,
    pub expectancy: f64,
    pub sharpe_ratio: f64,
    pub pattern_leaderboard: Vec<PatternStats>,
    /// Win rate of high-confidence signals minus the rest
    pub confidence_correlation: f64,
}

impl WinRateReport {
    pub fn empty() -> Self {
        WinRateReport {
            total_trades: 0,
            wins: 0,
            losses: 0,
            breakevens: 0,
            win_rate: 0.0,
            average_win: 0.0,
            average_loss: 0.0,
            profit_factor: 0.0,
            expectancy: 0.0,
            sharpe_ratio: 0.0,
            pattern_leaderboard: Vec::new(),
            confidence_correlation: 0.0,
        }
    }
}
