use indicator_engine::ConfluenceScore;
use regime_classifier::Regime;
use signal_core::round2;
use tracing::debug;

use crate::models::{
    EntryDecision, FinalSignal, GateReport, RiskRewardSetup, SignalVerdict, TimeframeAlignment,
};

/// Confluence percent required to pass the first gate
const CONFLUENCE_GATE: f64 = 60.0;
/// Number of gates a verdict is graded against
const GATE_COUNT: usize = 5;

/// Run the setup through the five pass/fail gates and grade the result.
///
/// Confluence and risk/reward are hard gates: failing either one skips
/// the trade outright regardless of the remaining checks. The other
/// three only degrade the verdict.
pub fn compose_signal(
    confluence: &ConfluenceScore,
    alignment: TimeframeAlignment,
    risk_reward: &RiskRewardSetup,
    entry: &EntryDecision,
    regime: Regime,
) -> SignalVerdict {
    let mut reasons = Vec::new();

    let confluence_passed = confluence.confluence_percent >= CONFLUENCE_GATE;
    if !confluence_passed {
        reasons.push(format!(
            "Confluence {}% below the {CONFLUENCE_GATE}% floor",
            confluence.confluence_percent
        ));
    }

    let alignment_passed = alignment.is_bullish();
    if !alignment_passed {
        reasons.push(format!("Timeframes are {}", alignment.name()));
    }

    let risk_reward_passed = risk_reward.is_valid;
    if !risk_reward_passed {
        reasons.push(format!(
            "Risk/reward {} below 2.0",
            risk_reward.risk_reward_ratio
        ));
    }

    let entry_passed = entry.is_ready();
    if !entry_passed {
        reasons.push(format!("No entry: {}", entry.reason));
    }

    let regime_passed = regime != Regime::Ranging;
    if !regime_passed {
        reasons.push("Ranging regime, mean-reversion odds against a breakout trade".to_string());
    }

    let passed_count = [
        confluence_passed,
        alignment_passed,
        risk_reward_passed,
        entry_passed,
        regime_passed,
    ]
    .iter()
    .filter(|&&p| p)
    .count();

    let signal = if !confluence_passed || !risk_reward_passed {
        FinalSignal::Skip
    } else {
        match passed_count {
            5 => FinalSignal::StrongBuy,
            4 => FinalSignal::Buy,
            3 => FinalSignal::Neutral,
            _ => FinalSignal::Skip,
        }
    };

    let confidence = round2(passed_count as f64 / GATE_COUNT as f64 * 100.0);

    debug!(
        signal = signal.name(),
        passed_count, confidence, "composed final signal"
    );

    SignalVerdict {
        signal,
        confidence,
        gates: GateReport {
            confluence_passed,
            alignment_passed,
            risk_reward_passed,
            entry_passed,
            regime_passed,
            passed_count,
            reasons,
        },
    }
}
