use serde::{Deserialize, Serialize};

/// ATR-derived stop/target levels for a long setup.
///
/// `position_size` is a suggested sizing multiplier, not a capital
/// fraction; values above 100 are intentional and mean the risk budget
/// tolerates a larger-than-full position at this stop distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRewardSetup {
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub risk_reward_ratio: f64,
    /// Ratio of at least 2:1
    pub is_valid: bool,
    pub position_size: f64,
    pub potential_gain_percent: f64,
    pub potential_loss_percent: f64,
}

/// How (and whether) to enter after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStrategy {
    Immediate,
    WaitForConfirmation,
    SupportBounce,
    Breakout,
    NoEntry,
}

impl EntryStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            EntryStrategy::Immediate => "Immediate",
            EntryStrategy::WaitForConfirmation => "Wait For Confirmation",
            EntryStrategy::SupportBounce => "Support Bounce",
            EntryStrategy::Breakout => "Breakout",
            EntryStrategy::NoEntry => "No Entry",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDecision {
    pub strategy: EntryStrategy,
    pub entry_price: Option<f64>,
    pub hold_minutes: Option<u32>,
    pub reason: String,
}

impl EntryDecision {
    pub fn is_ready(&self) -> bool {
        self.strategy != EntryStrategy::NoEntry
    }
}

/// Directional agreement across the 5m/1h/24h change snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeframeAlignment {
    StrongBullish,
    Bullish,
    Mixed,
    Bearish,
    StrongBearish,
}

impl TimeframeAlignment {
    /// Derive alignment from the three percentage-change windows.
    pub fn from_changes(change_5m: f64, change_1h: f64, change_24h: f64) -> Self {
        let positives = [change_5m, change_1h, change_24h]
            .iter()
            .filter(|&&c| c > 0.0)
            .count();

        match positives {
            3 if change_24h > 5.0 => TimeframeAlignment::StrongBullish,
            3 | 2 => TimeframeAlignment::Bullish,
            1 => TimeframeAlignment::Mixed,
            _ if change_24h < -5.0 => TimeframeAlignment::StrongBearish,
            _ => TimeframeAlignment::Bearish,
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(
            self,
            TimeframeAlignment::StrongBullish | TimeframeAlignment::Bullish
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimeframeAlignment::StrongBullish => "Strong Bullish",
            TimeframeAlignment::Bullish => "Bullish",
            TimeframeAlignment::Mixed => "Mixed",
            TimeframeAlignment::Bearish => "Bearish",
            TimeframeAlignment::StrongBearish => "Strong Bearish",
        }
    }
}

/// Terminal classification for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalSignal {
    StrongBuy,
    Buy,
    Neutral,
    Skip,
}

impl FinalSignal {
    pub fn name(&self) -> &'static str {
        match self {
            FinalSignal::StrongBuy => "STRONG BUY",
            FinalSignal::Buy => "BUY",
            FinalSignal::Neutral => "NEUTRAL",
            FinalSignal::Skip => "SKIP",
        }
    }
}

/// Per-gate breakdown surfaced to the display and prompt layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateReport {
    pub confluence_passed: bool,
    pub alignment_passed: bool,
    pub risk_reward_passed: bool,
    pub entry_passed: bool,
    pub regime_passed: bool,
    pub passed_count: usize,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalVerdict {
    pub signal: FinalSignal,
    /// passed gates / 5, scaled to 0-100
    pub confidence: f64,
    pub gates: GateReport,
}
