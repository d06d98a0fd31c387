use serde::{Deserialize, Serialize};
use signal_core::{round2, ConfidenceLevel};

use crate::analyzer::IndicatorAnalysis;

/// Number of directional indicators polled for confluence.
pub const CONFLUENCE_INDICATORS: usize = 8;

/// Agreement ratio across the eight directional indicator signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfluenceScore {
    pub total_indicators: usize,
    /// Size of the larger directional camp
    pub agreeing_indicators: usize,
    pub confluence_percent: f64,
    pub bullish_count: usize,
    pub bearish_count: usize,
    pub confidence: ConfidenceLevel,
    pub tradeable: bool,
}

/// Count agreement across the eight indicator biases. Each indicator
/// contributes through its structured `SignalBias` tag, never through its
/// display label.
pub fn score_confluence(analysis: &IndicatorAnalysis) -> ConfluenceScore {
    let biases = analysis.directional_biases();

    let bullish: [bool; CONFLUENCE_INDICATORS] = biases.map(|b| b.is_bullish());
    let bearish: [bool; CONFLUENCE_INDICATORS] = biases.map(|b| b.is_bearish());

    let bullish_count = bullish.iter().filter(|&&b| b).count();
    let bearish_count = bearish.iter().filter(|&&b| b).count();
    let agreeing = bullish_count.max(bearish_count);
    let firing = bullish_count + bearish_count;

    // All-neutral reads as 50, not 0: no signals is no information,
    // not maximum disagreement.
    let percent = if firing == 0 {
        50.0
    } else {
        round2(agreeing as f64 / firing as f64 * 100.0)
    };

    ConfluenceScore {
        total_indicators: CONFLUENCE_INDICATORS,
        agreeing_indicators: agreeing,
        confluence_percent: percent,
        bullish_count,
        bearish_count,
        confidence: ConfidenceLevel::from_confirmations(agreeing),
        tradeable: percent >= 60.0,
    }
}
