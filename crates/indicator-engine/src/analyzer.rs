use serde::Serialize;
use signal_core::{
    round2, AnalysisError, Candle, ConfidenceLevel, PriceHistoryProvider, Recommendation,
    SignalBias, TokenMetrics,
};
use tracing::debug;

use crate::history::SyntheticWalk;
use crate::indicators::*;

/// Number of candles synthesized when the caller has no real history.
const SYNTHETIC_HISTORY_LEN: usize = 120;

/// Full indicator snapshot for one token evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorAnalysis {
    pub symbol: String,
    pub current_price: f64,
    pub rsi: RsiReading,
    pub ema_cross: EmaCrossReading,
    pub macd: MacdReading,
    pub bollinger: BollingerReading,
    pub atr: AtrReading,
    pub obv: ObvReading,
    pub stochastic: StochasticReading,
    pub adx: AdxReading,
    pub vwap: VwapReading,
    pub ichimoku: IchimokuReading,
    /// Composite 0-100 score from additive point contributions
    pub overall: f64,
    pub confidence: ConfidenceLevel,
    pub recommendation: Recommendation,
}

impl IndicatorAnalysis {
    /// The eight directional biases consumed by the confluence scorer.
    /// ADX is strength-only and excluded.
    pub fn directional_biases(&self) -> [SignalBias; 8] {
        [
            self.rsi.bias,
            self.macd.bias,
            self.ema_cross.bias,
            self.bollinger.bias,
            self.stochastic.bias,
            self.obv.bias,
            self.vwap.bias,
            self.ichimoku.bias,
        ]
    }
}

/// Runs every calculator over a token snapshot and aggregates the results.
///
/// When no real history is supplied the injected provider synthesizes one,
/// so the engine itself stays deterministic for a given candle window.
pub struct IndicatorEngine {
    history: Box<dyn PriceHistoryProvider>,
}

impl IndicatorEngine {
    pub fn new(history: Box<dyn PriceHistoryProvider>) -> Self {
        Self { history }
    }

    pub fn analyze(
        &self,
        metrics: &TokenMetrics,
        history: Option<&[Candle]>,
    ) -> Result<IndicatorAnalysis, AnalysisError> {
        if !metrics.price_usd.is_finite() || metrics.price_usd <= 0.0 {
            return Err(AnalysisError::InvalidData(format!(
                "non-positive price for {}: {}",
                metrics.symbol, metrics.price_usd
            )));
        }

        let synthesized;
        let candles: &[Candle] = match history {
            Some(h) => h,
            None => {
                synthesized = self.history.history(metrics, SYNTHETIC_HISTORY_LEN);
                debug!(
                    symbol = %metrics.symbol,
                    candles = synthesized.len(),
                    "no real history supplied, using synthetic walk"
                );
                &synthesized
            }
        };

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let rsi = rsi(&closes, 14);
        let ema_cross = ema_cross(&closes);
        let macd = macd(&closes);
        let bollinger = bollinger(&closes, 20);
        let atr = atr(candles, 14);
        let obv = obv(candles);
        let stochastic = stochastic(candles, 14);
        let adx = adx(candles, 14);
        let vwap = vwap(candles);
        let ichimoku = ichimoku(candles);

        let mut score: f64 = 50.0;

        // RSI magnitude
        if rsi.value < 25.0 {
            score += 20.0;
        } else if rsi.value < 30.0 {
            score += 15.0;
        } else if rsi.value > 75.0 {
            score -= 20.0;
        } else if rsi.value > 70.0 {
            score -= 15.0;
        }

        // EMA alignment
        match ema_cross.bias {
            SignalBias::Bullish => score += 10.0,
            SignalBias::Bearish => score -= 10.0,
            SignalBias::Neutral => {}
        }

        // MACD momentum tier
        if macd.histogram > 0.0 {
            score += if macd.strengthening { 15.0 } else { 10.0 };
        } else if macd.histogram < 0.0 {
            score -= if macd.strengthening { 15.0 } else { 10.0 };
        }

        // Bollinger extremity
        match bollinger.position {
            BandPosition::Below => score += 10.0,
            BandPosition::LowerHalf => score += 5.0,
            BandPosition::Above => score -= 10.0,
            BandPosition::UpperHalf => score -= 5.0,
            BandPosition::Middle => {}
        }

        // VWAP divergence
        match vwap.bias {
            SignalBias::Bullish => {
                score += if vwap.divergence_percent > 2.0 { 10.0 } else { 5.0 };
            }
            SignalBias::Bearish => {
                score -= if vwap.divergence_percent < -2.0 { 10.0 } else { 5.0 };
            }
            SignalBias::Neutral => {}
        }

        // ADX strength amplifies the EMA direction
        let adx_points = match adx.strength {
            TrendStrength::Strong => 5.0,
            TrendStrength::VeryStrong => 10.0,
            _ => 0.0,
        };
        match ema_cross.bias {
            SignalBias::Bullish => score += adx_points,
            SignalBias::Bearish => score -= adx_points,
            SignalBias::Neutral => {}
        }

        let overall = round2(score.clamp(0.0, 100.0));

        let analysis = IndicatorAnalysis {
            symbol: metrics.symbol.clone(),
            current_price: metrics.price_usd,
            rsi,
            ema_cross,
            macd,
            bollinger,
            atr,
            obv,
            stochastic,
            adx,
            vwap,
            ichimoku,
            overall,
            confidence: ConfidenceLevel::Low,
            recommendation: Recommendation::from_score(overall),
        };

        let direction_bullish = overall >= 50.0;
        let confirmations = analysis
            .directional_biases()
            .iter()
            .filter(|b| {
                if direction_bullish {
                    b.is_bullish()
                } else {
                    b.is_bearish()
                }
            })
            .count();

        Ok(IndicatorAnalysis {
            confidence: ConfidenceLevel::from_confirmations(confirmations),
            ..analysis
        })
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(Box::new(SyntheticWalk::new()))
    }
}
