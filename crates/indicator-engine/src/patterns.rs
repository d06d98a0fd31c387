use serde::{Deserialize, Serialize};
use signal_core::{round2, round8, SignalBias};

/// Chart shapes scanned for in the recent close window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartPattern {
    Triangle,
    CupAndHandle,
    DoubleBottom,
}

impl ChartPattern {
    pub fn name(&self) -> &'static str {
        match self {
            ChartPattern::Triangle => "Triangle",
            ChartPattern::CupAndHandle => "Cup and Handle",
            ChartPattern::DoubleBottom => "Double Bottom",
        }
    }
}

/// A detected chart pattern. Multiple patterns may co-fire on the same
/// window; the caller receives the set as-is with no dedup or priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSignal {
    pub pattern: ChartPattern,
    pub confidence: f64,
    pub direction: SignalBias,
    pub breakout_level: f64,
}

/// Samples scanned per evaluation.
const PATTERN_WINDOW: usize = 20;

/// How close the two bottoms of a double bottom must sit, and how far
/// below the third-lowest close they must both be.
const DOUBLE_BOTTOM_TOLERANCE: f64 = 0.02;

/// Maximum pullback below the cup rim that still reads as a handle.
const HANDLE_DEPTH: f64 = 0.05;

fn swing_points(closes: &[f64]) -> (Vec<(usize, f64)>, Vec<(usize, f64)>) {
    let mut highs = Vec::new();
    let mut lows = Vec::new();

    for i in 1..closes.len().saturating_sub(1) {
        if closes[i] > closes[i - 1] && closes[i] > closes[i + 1] {
            highs.push((i, closes[i]));
        }
        if closes[i] < closes[i - 1] && closes[i] < closes[i + 1] {
            lows.push((i, closes[i]));
        }
    }

    (highs, lows)
}

fn strictly_decreasing(values: impl Iterator<Item = f64> + Clone) -> bool {
    values.clone().zip(values.skip(1)).all(|(a, b)| b < a)
}

fn strictly_increasing(values: impl Iterator<Item = f64> + Clone) -> bool {
    values.clone().zip(values.skip(1)).all(|(a, b)| b > a)
}

/// Triangle: swing highs compressing down while swing lows step up.
/// Direction comes from where the current close sits relative to the
/// latest apex.
fn detect_triangle(closes: &[f64]) -> Option<PatternSignal> {
    let (highs, lows) = swing_points(closes);
    if highs.len() < 2 || lows.len() < 2 {
        return None;
    }

    if !strictly_decreasing(highs.iter().map(|&(_, v)| v))
        || !strictly_increasing(lows.iter().map(|&(_, v)| v))
    {
        return None;
    }

    let current = *closes.last()?;
    let apex_high = highs.last()?.1;
    let apex_low = lows.last()?.1;

    let (direction, breakout) = if current >= apex_high {
        (SignalBias::Bullish, apex_high)
    } else {
        (SignalBias::Bearish, apex_low)
    };

    let swings = highs.len() + lows.len();
    let confidence = (50.0 + 10.0 * swings as f64).min(90.0);

    Some(PatternSignal {
        pattern: ChartPattern::Triangle,
        confidence: round2(confidence),
        direction,
        breakout_level: round8(breakout),
    })
}

/// Cup and handle: U-shaped two-half comparison where the second half bottoms
/// above the first, with price pulled back shallowly under the first
/// half's rim.
fn detect_cup_and_handle(closes: &[f64]) -> Option<PatternSignal> {
    let half = closes.len() / 2;
    let first = &closes[..half];
    let second = &closes[half..];

    let first_low = first.iter().cloned().fold(f64::INFINITY, f64::min);
    let second_low = second.iter().cloned().fold(f64::INFINITY, f64::min);
    let rim = first.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let current = *closes.last()?;

    if second_low <= first_low {
        return None;
    }
    if current >= rim || current < rim * (1.0 - HANDLE_DEPTH) {
        return None;
    }

    Some(PatternSignal {
        pattern: ChartPattern::CupAndHandle,
        confidence: 70.0,
        direction: SignalBias::Bullish,
        breakout_level: round8(rim),
    })
}

/// Double bottom: the two lowest closes within 2% of each other, both
/// meaningfully below the third-lowest.
fn detect_double_bottom(closes: &[f64]) -> Option<PatternSignal> {
    if closes.len() < 3 {
        return None;
    }

    let mut indexed: Vec<(usize, f64)> = closes.iter().cloned().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let (i1, b1) = indexed[0];
    let (i2, b2) = indexed[1];
    let (_, third) = indexed[2];

    if b1 <= 0.0 {
        return None;
    }
    if (b2 - b1) / b1 > DOUBLE_BOTTOM_TOLERANCE {
        return None;
    }
    if third < b2 * (1.0 + DOUBLE_BOTTOM_TOLERANCE) {
        return None;
    }

    // Neckline: highest close between the two bottoms.
    let (lo, hi) = if i1 < i2 { (i1, i2) } else { (i2, i1) };
    let neckline = closes[lo..=hi]
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    Some(PatternSignal {
        pattern: ChartPattern::DoubleBottom,
        confidence: 75.0,
        direction: SignalBias::Bullish,
        breakout_level: round8(neckline),
    })
}

/// Scan the most recent 20 closes for chart patterns.
pub fn detect_patterns(closes: &[f64]) -> Vec<PatternSignal> {
    if closes.len() < PATTERN_WINDOW {
        return vec![];
    }

    let window = &closes[closes.len() - PATTERN_WINDOW..];
    let mut signals = Vec::new();

    if let Some(p) = detect_triangle(window) {
        signals.push(p);
    }
    if let Some(p) = detect_cup_and_handle(window) {
        signals.push(p);
    }
    if let Some(p) = detect_double_bottom(window) {
        signals.push(p);
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_window_yields_nothing() {
        let closes = vec![1.0; 10];
        assert!(detect_patterns(&closes).is_empty());
    }

    #[test]
    fn test_triangle_detection() {
        // Converging oscillation: lower highs, higher lows, apex near 100.
        let closes = vec![
            100.0, 108.0, 99.0, 94.0, 100.0, 106.5, 99.5, 95.0, 100.0, 105.0,
            99.8, 96.0, 100.0, 104.0, 99.9, 97.0, 100.0, 103.0, 99.95, 100.5,
        ];
        let signals = detect_patterns(&closes);

        let triangle = signals
            .iter()
            .find(|s| s.pattern == ChartPattern::Triangle)
            .expect("triangle should fire");
        assert!(triangle.confidence >= 50.0 && triangle.confidence <= 90.0);
        assert!(triangle.breakout_level > 0.0);
    }

    #[test]
    fn test_cup_and_handle_detection() {
        // First half dips to 90 and rims at 100; second half recovers and
        // pulls back just under the rim.
        let closes = vec![
            100.0, 97.0, 94.0, 92.0, 90.0, 90.5, 92.0, 94.0, 96.0, 98.0,
            99.0, 99.5, 99.8, 99.9, 99.9, 99.8, 99.5, 99.0, 98.5, 98.0,
        ];
        let signals = detect_patterns(&closes);

        let cup = signals
            .iter()
            .find(|s| s.pattern == ChartPattern::CupAndHandle)
            .expect("cup and handle should fire");
        assert_eq!(cup.direction, SignalBias::Bullish);
        assert!((cup.breakout_level - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_bottom_detection() {
        let closes = vec![
            100.0, 98.0, 95.0, 90.0, 93.0, 94.0, 97.0, 98.0, 96.0, 94.0,
            90.5, 93.0, 95.0, 97.0, 98.0, 99.0, 99.5, 100.0, 100.5, 101.0,
        ];
        let signals = detect_patterns(&closes);

        let db = signals
            .iter()
            .find(|s| s.pattern == ChartPattern::DoubleBottom)
            .expect("double bottom should fire");
        assert_eq!(db.direction, SignalBias::Bullish);
        // Neckline is the highest close between the two bottoms.
        assert!((db.breakout_level - 98.0).abs() < 1e-9);
    }

    #[test]
    fn test_bottoms_too_far_apart_do_not_fire() {
        // Second-lowest is 5% above the lowest, outside the 2% pairing.
        let closes = vec![
            100.0, 98.0, 96.0, 90.0, 92.0, 95.0, 97.0, 98.0, 97.0, 96.0,
            94.5, 95.5, 96.5, 97.5, 98.0, 99.0, 99.5, 100.0, 100.5, 101.0,
        ];
        let signals = detect_patterns(&closes);
        assert!(signals
            .iter()
            .all(|s| s.pattern != ChartPattern::DoubleBottom));
    }

    #[test]
    fn test_flat_window_fires_nothing() {
        let closes = vec![100.0; 20];
        assert!(detect_patterns(&closes).is_empty());
    }
}
