use serde::{Deserialize, Serialize};
use signal_core::{round2, Candle, VolatilityTier};

/// Qualitative market behavior classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// Directional move with ADX confirmation
    Trending,

    /// No directional conviction, price oscillating between levels
    Ranging,

    /// Trending plus an expanding short-term range
    Breakout,

    /// Ranging compressed into a tight consolidation
    Reversal,
}

impl Regime {
    pub fn name(&self) -> &'static str {
        match self {
            Regime::Trending => "Trending",
            Regime::Ranging => "Ranging",
            Regime::Breakout => "Breakout",
            Regime::Reversal => "Reversal",
        }
    }

    /// Fixed advisory string surfaced in chat output
    pub fn advisory(&self) -> &'static str {
        match self {
            Regime::Trending => "Trend-following entries favored; trail stops with the move",
            Regime::Ranging => "Fade the extremes; avoid chasing breakouts",
            Regime::Breakout => "Momentum entries favored; size up only after confirmation",
            Regime::Reversal => "Tight consolidation; watch for a direction change",
        }
    }
}

/// ADX threshold separating trending from ranging behavior
const ADX_TREND_THRESHOLD: f64 = 25.0;

/// Classification result with the inputs that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeReading {
    pub regime: Regime,
    pub adx_value: f64,
    pub volatility: VolatilityTier,
    pub recommendation: &'static str,
}

/// Classify the market from ADX, ATR-as-percent-of-price and the recent
/// price window.
///
/// ADX above 25 reads as trending, upgraded to breakout when the 5-sample
/// high-low range exceeds 2% of the 5-sample average price. At or below
/// 25 reads as ranging, downgraded to reversal when the 10-sample range
/// is under 1% of the 10-sample low. Short windows skip the range checks
/// and keep the base label; this never errors.
pub fn classify(adx: f64, atr_percent: f64, window: &[Candle]) -> RegimeReading {
    let volatility = VolatilityTier::from_atr_percent(atr_percent);

    let regime = if adx > ADX_TREND_THRESHOLD {
        if is_breakout(window) {
            Regime::Breakout
        } else {
            Regime::Trending
        }
    } else if is_tight_consolidation(window) {
        Regime::Reversal
    } else {
        Regime::Ranging
    };

    RegimeReading {
        regime,
        adx_value: round2(adx),
        volatility,
        recommendation: regime.advisory(),
    }
}

/// 5-sample high-low range above 2% of the 5-sample average price
fn is_breakout(window: &[Candle]) -> bool {
    if window.len() < 5 {
        return false;
    }

    let tail = &window[window.len() - 5..];
    let high = tail.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = tail.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let avg = tail.iter().map(|c| c.close).sum::<f64>() / 5.0;

    avg > 0.0 && (high - low) / avg > 0.02
}

/// 10-sample high-low range under 1% of the 10-sample low
fn is_tight_consolidation(window: &[Candle]) -> bool {
    if window.len() < 10 {
        return false;
    }

    let tail = &window[window.len() - 10..];
    let high = tail.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = tail.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

    low > 0.0 && (high - low) / low < 0.01
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(spread: f64, count: usize) -> Vec<Candle> {
        (0..count)
            .map(|_| Candle {
                price: 100.0,
                high: 100.0 + spread / 2.0,
                low: 100.0 - spread / 2.0,
                close: 100.0,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn test_high_adx_narrow_range_is_trending() {
        let reading = classify(30.0, 1.5, &candles(1.0, 20));

        assert_eq!(reading.regime, Regime::Trending);
        assert_eq!(reading.volatility, VolatilityTier::Moderate);
    }

    #[test]
    fn test_high_adx_wide_range_is_breakout() {
        // 5-sample range of 3 on a price of 100 exceeds the 2% gate.
        let reading = classify(30.0, 2.5, &candles(3.0, 20));

        assert_eq!(reading.regime, Regime::Breakout);
        assert_eq!(reading.volatility, VolatilityTier::High);
    }

    #[test]
    fn test_low_adx_is_ranging() {
        let reading = classify(15.0, 1.5, &candles(2.0, 20));

        assert_eq!(reading.regime, Regime::Ranging);
    }

    #[test]
    fn test_low_adx_tight_window_is_reversal() {
        // Range 0.5 over a low near 99.75 is under 1%.
        let reading = classify(15.0, 0.3, &candles(0.5, 20));

        assert_eq!(reading.regime, Regime::Reversal);
        assert_eq!(reading.volatility, VolatilityTier::Low);
    }

    #[test]
    fn test_adx_boundary_stays_ranging() {
        let reading = classify(25.0, 1.0, &candles(2.0, 20));

        assert_eq!(reading.regime, Regime::Ranging);
    }

    #[test]
    fn test_short_window_keeps_base_labels() {
        assert_eq!(classify(30.0, 1.0, &candles(5.0, 3)).regime, Regime::Trending);
        assert_eq!(classify(10.0, 1.0, &candles(0.1, 3)).regime, Regime::Ranging);
    }

    #[test]
    fn test_reading_carries_advisory() {
        let reading = classify(30.0, 1.0, &candles(1.0, 20));

        assert_eq!(reading.recommendation, Regime::Trending.advisory());
        assert_eq!(reading.adx_value, 30.0);
    }
}
