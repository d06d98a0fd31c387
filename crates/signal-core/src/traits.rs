use crate::{Candle, TokenMetrics};

/// Source of price history for a token. Real adapters wrap a market-data
/// API; the synthetic random-walk provider stands in when no history is
/// available. The pipeline itself never does I/O, so the seam is
/// synchronous.
pub trait PriceHistoryProvider: Send + Sync {
    fn history(&self, metrics: &TokenMetrics, len: usize) -> Vec<Candle>;
}
