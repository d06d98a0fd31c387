use serde::{Deserialize, Serialize};

/// One sample of a price series. Series are chronological, oldest first,
/// supplied as fixed-length windows by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub price: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// A flat candle at a single price, used when synthesizing history.
    pub fn flat(price: f64, volume: f64) -> Self {
        Self {
            price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }
}

/// Snapshot of a token's market state as reported by an external
/// market-data fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub symbol: String,
    pub price_usd: f64,
    /// Percent change over the last 5 minutes
    pub change_5m: f64,
    /// Percent change over the last hour
    pub change_1h: f64,
    /// Percent change over the last 24 hours
    pub change_24h: f64,
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub buys_24h: u32,
    pub sells_24h: u32,
    pub market_cap: f64,
}

/// Directional tag attached to every indicator result at the point of
/// calculation. Downstream scoring consumes this tag, never the display
/// label, so formatting changes cannot alter signal logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalBias {
    Bullish,
    Bearish,
    Neutral,
}

impl SignalBias {
    pub fn is_bullish(&self) -> bool {
        matches!(self, SignalBias::Bullish)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, SignalBias::Bearish)
    }
}

/// Ordinal confidence tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Fair,
    Moderate,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn name(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Fair => "Fair",
            ConfidenceLevel::Moderate => "Moderate",
            ConfidenceLevel::High => "High",
            ConfidenceLevel::VeryHigh => "Very High",
        }
    }

    /// Map a count of confirming signals (0..=8) to a tier.
    pub fn from_confirmations(count: usize) -> Self {
        match count {
            0..=1 => ConfidenceLevel::Low,
            2..=3 => ConfidenceLevel::Fair,
            4..=5 => ConfidenceLevel::Moderate,
            6..=7 => ConfidenceLevel::High,
            _ => ConfidenceLevel::VeryHigh,
        }
    }
}

/// Recommendation tag mapped from the 0-100 overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    CautiousBuy,
    Neutral,
    CautiousSell,
    Sell,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Recommendation::Buy
        } else if score >= 60.0 {
            Recommendation::CautiousBuy
        } else if score >= 40.0 {
            Recommendation::Neutral
        } else if score >= 25.0 {
            Recommendation::CautiousSell
        } else {
            Recommendation::Sell
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::CautiousBuy => "CAUTIOUS BUY",
            Recommendation::Neutral => "NEUTRAL",
            Recommendation::CautiousSell => "CAUTIOUS SELL",
            Recommendation::Sell => "SELL",
        }
    }
}

/// Volatility tier from ATR as a percentage of price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VolatilityTier {
    Low,
    Moderate,
    High,
    Extreme,
}

impl VolatilityTier {
    pub fn from_atr_percent(atr_percent: f64) -> Self {
        if atr_percent < 1.0 {
            VolatilityTier::Low
        } else if atr_percent < 2.0 {
            VolatilityTier::Moderate
        } else if atr_percent < 3.0 {
            VolatilityTier::High
        } else {
            VolatilityTier::Extreme
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VolatilityTier::Low => "Low",
            VolatilityTier::Moderate => "Moderate",
            VolatilityTier::High => "High",
            VolatilityTier::Extreme => "Extreme",
        }
    }
}

/// Round to 2 decimals, used for oscillators and percentages.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 8 decimals, used for price-scale values (micro-cap token
/// prices need the extra precision).
pub fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(Recommendation::from_score(75.0), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(74.9), Recommendation::CautiousBuy);
        assert_eq!(Recommendation::from_score(60.0), Recommendation::CautiousBuy);
        assert_eq!(Recommendation::from_score(59.9), Recommendation::Neutral);
        assert_eq!(Recommendation::from_score(40.0), Recommendation::Neutral);
        assert_eq!(Recommendation::from_score(39.9), Recommendation::CautiousSell);
        assert_eq!(Recommendation::from_score(25.0), Recommendation::CautiousSell);
        assert_eq!(Recommendation::from_score(24.9), Recommendation::Sell);
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceLevel::from_confirmations(0), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confirmations(3), ConfidenceLevel::Fair);
        assert_eq!(ConfidenceLevel::from_confirmations(5), ConfidenceLevel::Moderate);
        assert_eq!(ConfidenceLevel::from_confirmations(7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confirmations(8), ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round8(0.000001234567891), 0.00000123);
    }
}
