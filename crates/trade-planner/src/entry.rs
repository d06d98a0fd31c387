use indicator_engine::{BandPosition, IndicatorAnalysis, PatternSignal};
use signal_core::round8;

use crate::models::{EntryDecision, EntryStrategy};

/// Score threshold for entering immediately on a pattern
const IMMEDIATE_SCORE: f64 = 80.0;
/// Score threshold for waiting out a pullback
const CONFIRMATION_SCORE: f64 = 70.0;
/// Score floor for a breakout-level entry
const BREAKOUT_SCORE: f64 = 60.0;
/// How long to sit on a wait-for-confirmation call
const CONFIRMATION_HOLD_MINUTES: u32 = 5;

/// Pick an entry strategy for the setup. Rules are checked in order and
/// the first match wins; a strong score with pattern backing beats
/// everything else, and band position is only consulted once the
/// momentum-driven rules have failed.
pub fn decide_entry(
    analysis: &IndicatorAnalysis,
    patterns: &[PatternSignal],
    last_close: f64,
    reference_close: f64,
) -> EntryDecision {
    let score = analysis.overall;

    if score >= IMMEDIATE_SCORE && !patterns.is_empty() {
        return EntryDecision {
            strategy: EntryStrategy::Immediate,
            entry_price: Some(round8(last_close)),
            hold_minutes: None,
            reason: format!(
                "Score {score:.0} with {} pattern confirmation",
                patterns[0].pattern.name()
            ),
        };
    }

    if score >= CONFIRMATION_SCORE && last_close <= reference_close {
        return EntryDecision {
            strategy: EntryStrategy::WaitForConfirmation,
            entry_price: None,
            hold_minutes: Some(CONFIRMATION_HOLD_MINUTES),
            reason: format!("Score {score:.0} but price is pulling back, wait for a higher close"),
        };
    }

    if matches!(
        analysis.bollinger.position,
        BandPosition::LowerHalf | BandPosition::Below
    ) {
        return EntryDecision {
            strategy: EntryStrategy::SupportBounce,
            entry_price: Some(round8(analysis.bollinger.lower)),
            hold_minutes: None,
            reason: "Price near lower band, stage a limit order at the band".to_string(),
        };
    }

    if !patterns.is_empty() && score >= BREAKOUT_SCORE {
        return EntryDecision {
            strategy: EntryStrategy::Breakout,
            entry_price: Some(round8(patterns[0].breakout_level)),
            hold_minutes: None,
            reason: format!(
                "{} forming, enter on break of {:.4}",
                patterns[0].pattern.name(),
                patterns[0].breakout_level
            ),
        };
    }

    EntryDecision {
        strategy: EntryStrategy::NoEntry,
        entry_price: None,
        hold_minutes: None,
        reason: format!("Score {score:.0} with no setup worth taking"),
    }
}
