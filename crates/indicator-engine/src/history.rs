use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use signal_core::{Candle, PriceHistoryProvider, TokenMetrics};

/// Random-walk price history for tokens with no real candle data.
///
/// Step volatility scales with the magnitude of the 24h change so quiet
/// tokens synthesize quiet histories. The walk is rescaled to end exactly
/// at the current price, and the RNG is injected so tests can seed it.
pub struct SyntheticWalk {
    rng: Mutex<StdRng>,
}

impl SyntheticWalk {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic walk for tests and reproducible prompts.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SyntheticWalk {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceHistoryProvider for SyntheticWalk {
    fn history(&self, metrics: &TokenMetrics, len: usize) -> Vec<Candle> {
        if len == 0 || !(metrics.price_usd > 0.0) {
            return vec![];
        }

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        // Per-step volatility derived from the 24h move, floored so a
        // perfectly flat token still gets a usable range.
        let step_vol = (metrics.change_24h.abs() / 100.0 / (len as f64).sqrt()).max(0.002);
        let avg_volume = if metrics.volume_24h > 0.0 {
            metrics.volume_24h / len as f64
        } else {
            1.0
        };

        let mut closes = Vec::with_capacity(len);
        let mut price = metrics.price_usd;
        for _ in 0..len {
            closes.push(price);
            let shock: f64 = rng.gen_range(-1.0..1.0);
            price *= 1.0 + shock * step_vol;
        }

        // Rescale so the walk lands on the live price.
        let last = *closes.last().unwrap();
        let scale = if last > 0.0 { metrics.price_usd / last } else { 1.0 };

        closes
            .iter()
            .map(|&c| {
                let close = c * scale;
                let spread: f64 = rng.gen_range(0.0..step_vol);
                let volume = avg_volume * rng.gen_range(0.5..1.5);
                Candle {
                    price: close,
                    high: close * (1.0 + spread),
                    low: close * (1.0 - spread),
                    close,
                    volume,
                }
            })
            .collect()
    }
}
