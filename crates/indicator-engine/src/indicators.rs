use serde::{Deserialize, Serialize};
use signal_core::{round2, round8, Candle, SignalBias, VolatilityTier};

/// Label attached when a window is shorter than the indicator's period.
pub const INSUFFICIENT_DATA: &str = "Insufficient Data";

/// Exponential Moving Average, seeded with the simple average of the
/// first `period` samples, multiplier 2/(period+1).
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    if data.len() < period {
        return vec![data.iter().sum::<f64>() / data.len() as f64];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());

    let seed: f64 = data[..period].iter().sum::<f64>() / period as f64;
    result.push(seed);

    for i in 1..data.len() {
        let prev = result[i - 1];
        result.push((data[i] - prev) * multiplier + prev);
    }

    result
}

/// Relative Strength Index over a fixed window.
///
/// Averages gains/losses over the first `period` deltas of the window
/// (not a running Wilder average across the whole series). Zero average
/// loss maps to 100; a fully flat window maps to 50.
#[derive(Debug, Clone, Serialize)]
pub struct RsiReading {
    pub value: f64,
    pub bias: SignalBias,
    pub label: &'static str,
}

pub fn rsi(closes: &[f64], period: usize) -> RsiReading {
    if period == 0 || closes.len() < period + 1 {
        return RsiReading {
            value: 50.0,
            bias: SignalBias::Neutral,
            label: INSUFFICIENT_DATA,
        };
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gain_sum += change;
        } else {
            loss_sum += change.abs();
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    let value = if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    let (bias, label) = if value < 30.0 {
        (SignalBias::Bullish, "Oversold")
    } else if value > 70.0 {
        (SignalBias::Bearish, "Overbought")
    } else {
        (SignalBias::Neutral, "Neutral")
    };

    RsiReading {
        value: round2(value),
        bias,
        label,
    }
}

/// EMA(12) vs EMA(26) alignment on closes.
#[derive(Debug, Clone, Serialize)]
pub struct EmaCrossReading {
    pub ema_12: f64,
    pub ema_26: f64,
    pub bias: SignalBias,
    pub label: &'static str,
}

pub fn ema_cross(closes: &[f64]) -> EmaCrossReading {
    if closes.len() < 26 {
        return EmaCrossReading {
            ema_12: 0.0,
            ema_26: 0.0,
            bias: SignalBias::Neutral,
            label: INSUFFICIENT_DATA,
        };
    }

    let fast = *ema(closes, 12).last().unwrap_or(&0.0);
    let slow = *ema(closes, 26).last().unwrap_or(&0.0);

    let (bias, label) = if fast > slow {
        (SignalBias::Bullish, "Bullish Alignment")
    } else if fast < slow {
        (SignalBias::Bearish, "Bearish Alignment")
    } else {
        (SignalBias::Neutral, "Flat")
    };

    EmaCrossReading {
        ema_12: round8(fast),
        ema_26: round8(slow),
        bias,
        label,
    }
}

/// MACD line, signal line and histogram.
///
/// The signal line is the EMA(9) of a MACD history rebuilt by recomputing
/// EMA(12)/EMA(26) over each trailing 26-sample sub-window. That O(n^2)
/// re-derivation (rather than a streaming EMA) is the numeric contract.
#[derive(Debug, Clone, Serialize)]
pub struct MacdReading {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
    /// Whether the MACD history is still moving in the direction of the
    /// histogram (momentum widening rather than fading).
    pub strengthening: bool,
    pub bias: SignalBias,
    pub label: &'static str,
}

pub fn macd(closes: &[f64]) -> MacdReading {
    if closes.len() < 26 {
        return MacdReading {
            macd_line: 0.0,
            signal_line: 0.0,
            histogram: 0.0,
            strengthening: false,
            bias: SignalBias::Neutral,
            label: INSUFFICIENT_DATA,
        };
    }

    let macd_at = |window: &[f64]| -> f64 {
        let fast = *ema(window, 12).last().unwrap_or(&0.0);
        let slow = *ema(window, 26).last().unwrap_or(&0.0);
        fast - slow
    };

    let mut macd_history = Vec::with_capacity(closes.len() - 25);
    for end in 26..=closes.len() {
        macd_history.push(macd_at(&closes[end - 26..end]));
    }

    let macd_line = *macd_history.last().unwrap_or(&0.0);
    let signal_line = *ema(&macd_history, 9).last().unwrap_or(&0.0);
    let histogram = macd_line - signal_line;

    let strengthening = if macd_history.len() >= 2 {
        let prev = macd_history[macd_history.len() - 2];
        (histogram > 0.0 && macd_line > prev) || (histogram < 0.0 && macd_line < prev)
    } else {
        false
    };

    let (bias, label) = if histogram > 0.0 {
        (SignalBias::Bullish, "Bullish Momentum")
    } else if histogram < 0.0 {
        (SignalBias::Bearish, "Bearish Momentum")
    } else {
        (SignalBias::Neutral, "Flat")
    };

    MacdReading {
        macd_line: round8(macd_line),
        signal_line: round8(signal_line),
        histogram: round8(histogram),
        strengthening,
        bias,
        label,
    }
}

/// Position of the current close relative to the Bollinger envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandPosition {
    Above,
    UpperHalf,
    Middle,
    LowerHalf,
    Below,
}

impl BandPosition {
    pub fn name(&self) -> &'static str {
        match self {
            BandPosition::Above => "Above Upper Band",
            BandPosition::UpperHalf => "Upper Half",
            BandPosition::Middle => "Middle",
            BandPosition::LowerHalf => "Lower Half",
            BandPosition::Below => "Below Lower Band",
        }
    }
}

/// Bollinger Bands: 20-sample SMA +/- 2 population standard deviations.
#[derive(Debug, Clone, Serialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub position: BandPosition,
    pub bias: SignalBias,
    pub label: &'static str,
}

pub fn bollinger(closes: &[f64], period: usize) -> BollingerReading {
    if period == 0 || closes.len() < period {
        return BollingerReading {
            upper: 0.0,
            middle: 0.0,
            lower: 0.0,
            position: BandPosition::Middle,
            bias: SignalBias::Neutral,
            label: INSUFFICIENT_DATA,
        };
    }

    let window = &closes[closes.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / period as f64;
    let std = variance.sqrt();

    let upper = mean + 2.0 * std;
    let lower = mean - 2.0 * std;
    let close = *closes.last().unwrap();

    // Flat window collapses the envelope; classify as Middle before the
    // half-band comparisons so upper == lower does not read as Above.
    let position = if upper == lower || close == mean {
        BandPosition::Middle
    } else if close > upper {
        BandPosition::Above
    } else if close < lower {
        BandPosition::Below
    } else if close > mean {
        BandPosition::UpperHalf
    } else {
        BandPosition::LowerHalf
    };

    let (bias, label) = match position {
        BandPosition::Below => (SignalBias::Bullish, "Below Lower Band"),
        BandPosition::LowerHalf => (SignalBias::Bullish, "Lower Half"),
        BandPosition::Above => (SignalBias::Bearish, "Above Upper Band"),
        BandPosition::UpperHalf => (SignalBias::Bearish, "Upper Half"),
        BandPosition::Middle => (SignalBias::Neutral, "Middle"),
    };

    BollingerReading {
        upper: round8(upper),
        middle: round8(mean),
        lower: round8(lower),
        position,
        bias,
        label,
    }
}

/// Average True Range over the last `period` samples.
///
/// True range uses index-aligned high/low/close with no prior-close
/// shift, a deliberate approximation of Wilder's ATR, preserved as-is.
#[derive(Debug, Clone, Serialize)]
pub struct AtrReading {
    pub value: f64,
    /// ATR as a percentage of the last close
    pub percent: f64,
    pub volatility: VolatilityTier,
    pub label: &'static str,
}

pub fn atr(candles: &[Candle], period: usize) -> AtrReading {
    if period == 0 || candles.len() < period {
        return AtrReading {
            value: 0.0,
            percent: 0.0,
            volatility: VolatilityTier::Low,
            label: INSUFFICIENT_DATA,
        };
    }

    let window = &candles[candles.len() - period..];
    let tr_sum: f64 = window
        .iter()
        .map(|c| {
            (c.high - c.low)
                .max((c.high - c.close).abs())
                .max((c.low - c.close).abs())
        })
        .sum();
    let value = tr_sum / period as f64;

    let close = candles.last().map(|c| c.close).unwrap_or(0.0);
    let percent = if close > 0.0 { value / close * 100.0 } else { 0.0 };
    let volatility = VolatilityTier::from_atr_percent(percent);

    AtrReading {
        value: round8(value),
        percent: round2(percent),
        volatility,
        label: volatility.name(),
    }
}

/// On-Balance Volume: cumulative running sum seeded with the first
/// volume sample. Trend compares the endpoints of the last 10 values.
#[derive(Debug, Clone, Serialize)]
pub struct ObvReading {
    pub value: f64,
    pub bias: SignalBias,
    pub label: &'static str,
}

pub fn obv(candles: &[Candle]) -> ObvReading {
    if candles.is_empty() {
        return ObvReading {
            value: 0.0,
            bias: SignalBias::Neutral,
            label: INSUFFICIENT_DATA,
        };
    }

    let mut values = Vec::with_capacity(candles.len());
    values.push(candles[0].volume);
    for i in 1..candles.len() {
        let prev = values[i - 1];
        let next = if candles[i].close > candles[i - 1].close {
            prev + candles[i].volume
        } else if candles[i].close < candles[i - 1].close {
            prev - candles[i].volume
        } else {
            prev
        };
        values.push(next);
    }

    let tail = &values[values.len().saturating_sub(10)..];
    let (bias, label) = match (tail.first(), tail.last()) {
        (Some(first), Some(last)) if last > first => (SignalBias::Bullish, "Accumulation"),
        (Some(first), Some(last)) if last < first => (SignalBias::Bearish, "Distribution"),
        _ => (SignalBias::Neutral, "Flat"),
    };

    ObvReading {
        value: round2(*values.last().unwrap()),
        bias,
        label,
    }
}

/// Stochastic oscillator.
///
/// %K is the position of the current close within the period's high-low
/// range. %D is the midpoint of the last two %K values, a simplified
/// stand-in for the usual moving average, preserved as-is.
#[derive(Debug, Clone, Serialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: f64,
    pub bias: SignalBias,
    pub label: &'static str,
}

fn stochastic_k(candles: &[Candle], period: usize) -> f64 {
    let window = &candles[candles.len() - period..];
    let highest = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let close = candles.last().map(|c| c.close).unwrap_or(0.0);

    if highest == lowest {
        50.0
    } else {
        100.0 * (close - lowest) / (highest - lowest)
    }
}

pub fn stochastic(candles: &[Candle], period: usize) -> StochasticReading {
    if period == 0 || candles.len() < period {
        return StochasticReading {
            k: 50.0,
            d: 50.0,
            bias: SignalBias::Neutral,
            label: INSUFFICIENT_DATA,
        };
    }

    let k = stochastic_k(candles, period);
    let k_prev = if candles.len() > period {
        stochastic_k(&candles[..candles.len() - 1], period)
    } else {
        k
    };
    let d = (k + k_prev) / 2.0;

    let (bias, label) = if k < 20.0 {
        (SignalBias::Bullish, "Oversold")
    } else if k > 80.0 {
        (SignalBias::Bearish, "Overbought")
    } else {
        (SignalBias::Neutral, "Neutral")
    };

    StochasticReading {
        k: round2(k),
        d: round2(d),
        bias,
        label,
    }
}

/// Trend strength tier for the ADX stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrendStrength {
    Weak,
    Building,
    Strong,
    VeryStrong,
}

impl TrendStrength {
    pub fn name(&self) -> &'static str {
        match self {
            TrendStrength::Weak => "Weak",
            TrendStrength::Building => "Building",
            TrendStrength::Strong => "Strong",
            TrendStrength::VeryStrong => "Very Strong",
        }
    }
}

/// ADX stand-in: directional efficiency of the last `period` close-to-close
/// moves, 100 * |sum(up) - sum(down)| / (sum(up) + sum(down)).
///
/// NOT Wilder's ADX. The heuristic is the contract; swapping in the
/// textbook formula would be a behavior change.
#[derive(Debug, Clone, Serialize)]
pub struct AdxReading {
    pub value: f64,
    pub strength: TrendStrength,
    pub label: &'static str,
}

pub fn adx(candles: &[Candle], period: usize) -> AdxReading {
    if period == 0 || candles.len() < period + 1 {
        return AdxReading {
            value: 0.0,
            strength: TrendStrength::Weak,
            label: INSUFFICIENT_DATA,
        };
    }

    let start = candles.len() - period - 1;
    let mut up = 0.0;
    let mut down = 0.0;
    for i in start + 1..candles.len() {
        let change = candles[i].close - candles[i - 1].close;
        if change > 0.0 {
            up += change;
        } else {
            down += change.abs();
        }
    }

    let total = up + down;
    let value = if total > 0.0 {
        100.0 * (up - down).abs() / total
    } else {
        0.0
    };

    let strength = if value < 20.0 {
        TrendStrength::Weak
    } else if value <= 25.0 {
        TrendStrength::Building
    } else if value <= 40.0 {
        TrendStrength::Strong
    } else {
        TrendStrength::VeryStrong
    };

    AdxReading {
        value: round2(value),
        strength,
        label: strength.name(),
    }
}

/// Volume-Weighted Average Price over the whole supplied window (not a
/// rolling session VWAP). Zero cumulative volume falls back to the
/// current close.
#[derive(Debug, Clone, Serialize)]
pub struct VwapReading {
    pub value: f64,
    /// Close-to-VWAP divergence as a percentage of VWAP
    pub divergence_percent: f64,
    pub bias: SignalBias,
    pub label: &'static str,
}

pub fn vwap(candles: &[Candle]) -> VwapReading {
    if candles.is_empty() {
        return VwapReading {
            value: 0.0,
            divergence_percent: 0.0,
            bias: SignalBias::Neutral,
            label: INSUFFICIENT_DATA,
        };
    }

    let total_pv: f64 = candles.iter().map(|c| c.price * c.volume).sum();
    let total_volume: f64 = candles.iter().map(|c| c.volume).sum();
    let close = candles.last().map(|c| c.close).unwrap_or(0.0);

    let value = if total_volume > 0.0 {
        total_pv / total_volume
    } else {
        close
    };

    let divergence = if value > 0.0 {
        (close - value) / value * 100.0
    } else {
        0.0
    };

    let (bias, label) = if close > value {
        (SignalBias::Bullish, "Above VWAP")
    } else if close < value {
        (SignalBias::Bearish, "Below VWAP")
    } else {
        (SignalBias::Neutral, "At VWAP")
    };

    VwapReading {
        value: round8(value),
        divergence_percent: round2(divergence),
        bias,
        label,
    }
}

/// Qualitative cloud signal from tenkan/kijun proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudPosition {
    AboveCloud,
    InCloud,
    BelowCloud,
}

impl CloudPosition {
    pub fn name(&self) -> &'static str {
        match self {
            CloudPosition::AboveCloud => "Above Cloud",
            CloudPosition::InCloud => "In Cloud",
            CloudPosition::BelowCloud => "Below Cloud",
        }
    }
}

/// Ichimoku signal: tenkan proxy is the 26-sample high-low midpoint,
/// kijun proxy the 52-sample midpoint, compared against the current close.
#[derive(Debug, Clone, Serialize)]
pub struct IchimokuReading {
    pub tenkan: f64,
    pub kijun: f64,
    pub cloud: CloudPosition,
    pub bias: SignalBias,
    pub label: &'static str,
}

fn midpoint(candles: &[Candle]) -> f64 {
    let highest = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    (highest + lowest) / 2.0
}

pub fn ichimoku(candles: &[Candle]) -> IchimokuReading {
    if candles.len() < 52 {
        return IchimokuReading {
            tenkan: 0.0,
            kijun: 0.0,
            cloud: CloudPosition::InCloud,
            bias: SignalBias::Neutral,
            label: INSUFFICIENT_DATA,
        };
    }

    let tenkan = midpoint(&candles[candles.len() - 26..]);
    let kijun = midpoint(&candles[candles.len() - 52..]);
    let close = candles.last().map(|c| c.close).unwrap_or(0.0);

    let (cloud, bias) = if close > tenkan && close > kijun {
        (CloudPosition::AboveCloud, SignalBias::Bullish)
    } else if close < tenkan && close < kijun {
        (CloudPosition::BelowCloud, SignalBias::Bearish)
    } else {
        (CloudPosition::InCloud, SignalBias::Neutral)
    };

    IchimokuReading {
        tenkan: round8(tenkan),
        kijun: round8(kijun),
        cloud,
        bias,
        label: cloud.name(),
    }
}
