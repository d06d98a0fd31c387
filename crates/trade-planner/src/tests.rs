use indicator_engine::{
    AdxReading, AtrReading, BandPosition, BollingerReading, ChartPattern, CloudPosition,
    ConfluenceScore, EmaCrossReading, IchimokuReading, IndicatorAnalysis, MacdReading, ObvReading,
    PatternSignal, RsiReading, StochasticReading, TrendStrength, VwapReading,
};
use regime_classifier::Regime;
use signal_core::{ConfidenceLevel, Recommendation, SignalBias, VolatilityTier};

use crate::composer::compose_signal;
use crate::entry::decide_entry;
use crate::models::*;
use crate::risk_reward::{plan_risk_reward, DEFAULT_ACCOUNT_RISK_PERCENT};

fn analysis_with(overall: f64, position: BandPosition) -> IndicatorAnalysis {
    IndicatorAnalysis {
        symbol: "TEST".to_string(),
        current_price: 100.0,
        rsi: RsiReading { value: 50.0, bias: SignalBias::Neutral, label: "Neutral" },
        ema_cross: EmaCrossReading {
            ema_12: 100.0,
            ema_26: 100.0,
            bias: SignalBias::Neutral,
            label: "Flat",
        },
        macd: MacdReading {
            macd_line: 0.0,
            signal_line: 0.0,
            histogram: 0.0,
            strengthening: false,
            bias: SignalBias::Neutral,
            label: "Flat",
        },
        bollinger: BollingerReading {
            upper: 104.0,
            middle: 100.0,
            lower: 96.0,
            position,
            bias: SignalBias::Neutral,
            label: "Middle",
        },
        atr: AtrReading {
            value: 1.0,
            percent: 1.0,
            volatility: VolatilityTier::Moderate,
            label: "Moderate",
        },
        obv: ObvReading { value: 0.0, bias: SignalBias::Neutral, label: "Flat" },
        stochastic: StochasticReading {
            k: 50.0,
            d: 50.0,
            bias: SignalBias::Neutral,
            label: "Neutral",
        },
        adx: AdxReading { value: 10.0, strength: TrendStrength::Weak, label: "Weak" },
        vwap: VwapReading {
            value: 100.0,
            divergence_percent: 0.0,
            bias: SignalBias::Neutral,
            label: "At VWAP",
        },
        ichimoku: IchimokuReading {
            tenkan: 100.0,
            kijun: 100.0,
            cloud: CloudPosition::InCloud,
            bias: SignalBias::Neutral,
            label: "In Cloud",
        },
        overall,
        confidence: ConfidenceLevel::Low,
        recommendation: Recommendation::from_score(overall),
    }
}

fn triangle_at(breakout_level: f64) -> PatternSignal {
    PatternSignal {
        pattern: ChartPattern::Triangle,
        confidence: 70.0,
        direction: SignalBias::Bullish,
        breakout_level,
    }
}

fn confluence_at(percent: f64) -> ConfluenceScore {
    ConfluenceScore {
        total_indicators: 8,
        agreeing_indicators: 6,
        confluence_percent: percent,
        bullish_count: 6,
        bearish_count: 0,
        confidence: ConfidenceLevel::High,
        tradeable: percent >= 60.0,
    }
}

fn entry_ready() -> EntryDecision {
    EntryDecision {
        strategy: EntryStrategy::Immediate,
        entry_price: Some(100.0),
        hold_minutes: None,
        reason: "test".to_string(),
    }
}

fn entry_none() -> EntryDecision {
    EntryDecision {
        strategy: EntryStrategy::NoEntry,
        entry_price: None,
        hold_minutes: None,
        reason: "nothing to take".to_string(),
    }
}

// --- risk/reward ---

#[test]
fn test_plan_unclamped_levels() {
    let setup = plan_risk_reward(100.0, 97.0, 103.0, 2.0, 2.0).unwrap();

    assert_eq!(setup.stop_loss, 97.0);
    assert_eq!(setup.take_profit, 106.0);
    assert_eq!(setup.risk_reward_ratio, 2.0);
    assert!(setup.is_valid);
    assert_eq!(setup.potential_loss_percent, 3.0);
    assert_eq!(setup.potential_gain_percent, 6.0);
    assert_eq!(setup.position_size, 66.67);
}

#[test]
fn test_stop_tightens_to_support() {
    let setup = plan_risk_reward(100.0, 99.0, 103.0, 2.0, 1.0).unwrap();

    // Raw stop 97 sits below support 99, so it pulls up to 99 * 0.99.
    assert_eq!(setup.stop_loss, 98.01);
    assert!(setup.stop_loss > 97.0);
}

#[test]
fn test_target_extends_past_resistance() {
    let setup = plan_risk_reward(100.0, 97.0, 110.0, 2.0, 1.0).unwrap();

    // Raw target 106 is short of resistance 110, so it pushes to 110 * 1.01.
    assert_eq!(setup.take_profit, 111.1);
    assert!(setup.risk_reward_ratio > 3.0);
}

#[test]
fn test_weak_ratio_is_not_valid() {
    // Tight stop clamp with a close target: reward barely covers risk.
    let setup = plan_risk_reward(100.0, 97.0, 100.5, 2.0, 1.0).unwrap();

    assert_eq!(setup.take_profit, 106.0);
    assert!(setup.is_valid);

    // Shrink the ATR so the target lands near entry.
    let tight = plan_risk_reward(100.0, 99.5, 100.2, 0.5, 1.0).unwrap();
    assert!(tight.risk_reward_ratio < 2.0);
    assert!(!tight.is_valid);
}

#[test]
fn test_plan_rejects_bad_inputs() {
    assert!(plan_risk_reward(0.0, 97.0, 103.0, 2.0, 1.0).is_err());
    assert!(plan_risk_reward(100.0, 97.0, 103.0, 0.0, 1.0).is_err());
    assert!(plan_risk_reward(f64::NAN, 97.0, 103.0, 2.0, 1.0).is_err());

    // Support above entry leaves no room for a stop.
    assert!(plan_risk_reward(100.0, 102.0, 103.0, 2.0, 1.0).is_err());
}

// --- entry cascade ---

#[test]
fn test_strong_score_with_pattern_enters_immediately() {
    let analysis = analysis_with(85.0, BandPosition::UpperHalf);
    let patterns = [triangle_at(105.0)];

    let decision = decide_entry(&analysis, &patterns, 102.0, 101.0);

    assert_eq!(decision.strategy, EntryStrategy::Immediate);
    assert_eq!(decision.entry_price, Some(102.0));
    assert!(decision.is_ready());
}

#[test]
fn test_pullback_waits_for_confirmation() {
    let analysis = analysis_with(72.0, BandPosition::Middle);

    let decision = decide_entry(&analysis, &[], 99.0, 100.0);

    assert_eq!(decision.strategy, EntryStrategy::WaitForConfirmation);
    assert_eq!(decision.entry_price, None);
    assert_eq!(decision.hold_minutes, Some(5));
}

#[test]
fn test_lower_band_stages_support_bounce() {
    let analysis = analysis_with(55.0, BandPosition::LowerHalf);

    let decision = decide_entry(&analysis, &[], 97.0, 98.0);

    assert_eq!(decision.strategy, EntryStrategy::SupportBounce);
    assert_eq!(decision.entry_price, Some(96.0));
}

#[test]
fn test_pattern_with_decent_score_targets_breakout_level() {
    let analysis = analysis_with(65.0, BandPosition::Middle);
    let patterns = [triangle_at(105.0)];

    // Price rising (no pullback), band in the middle: falls through to
    // the breakout rule.
    let decision = decide_entry(&analysis, &patterns, 101.0, 100.0);

    assert_eq!(decision.strategy, EntryStrategy::Breakout);
    assert_eq!(decision.entry_price, Some(105.0));
}

#[test]
fn test_nothing_matches_is_no_entry() {
    let analysis = analysis_with(45.0, BandPosition::Middle);

    let decision = decide_entry(&analysis, &[], 101.0, 100.0);

    assert_eq!(decision.strategy, EntryStrategy::NoEntry);
    assert!(!decision.is_ready());
}

#[test]
fn test_immediate_outranks_breakout() {
    // Score clears both the immediate and breakout bars; first rule wins.
    let analysis = analysis_with(90.0, BandPosition::Below);
    let patterns = [triangle_at(105.0)];

    let decision = decide_entry(&analysis, &patterns, 102.0, 100.0);

    assert_eq!(decision.strategy, EntryStrategy::Immediate);
}

// --- timeframe alignment ---

#[test]
fn test_alignment_from_changes() {
    assert_eq!(
        TimeframeAlignment::from_changes(1.0, 3.0, 8.0),
        TimeframeAlignment::StrongBullish
    );
    assert_eq!(
        TimeframeAlignment::from_changes(1.0, 3.0, 4.0),
        TimeframeAlignment::Bullish
    );
    assert_eq!(
        TimeframeAlignment::from_changes(-0.5, 3.0, 4.0),
        TimeframeAlignment::Bullish
    );
    assert_eq!(
        TimeframeAlignment::from_changes(-0.5, -1.0, 4.0),
        TimeframeAlignment::Mixed
    );
    assert_eq!(
        TimeframeAlignment::from_changes(-0.5, -1.0, -2.0),
        TimeframeAlignment::Bearish
    );
    assert_eq!(
        TimeframeAlignment::from_changes(-0.5, -1.0, -8.0),
        TimeframeAlignment::StrongBearish
    );
}

#[test]
fn test_alignment_bullish_flag() {
    assert!(TimeframeAlignment::StrongBullish.is_bullish());
    assert!(TimeframeAlignment::Bullish.is_bullish());
    assert!(!TimeframeAlignment::Mixed.is_bullish());
    assert!(!TimeframeAlignment::Bearish.is_bullish());
}

// --- signal composition ---

fn valid_setup() -> RiskRewardSetup {
    plan_risk_reward(100.0, 97.0, 103.0, 2.0, DEFAULT_ACCOUNT_RISK_PERCENT).unwrap()
}

#[test]
fn test_all_gates_pass_is_strong_buy() {
    let verdict = compose_signal(
        &confluence_at(75.0),
        TimeframeAlignment::Bullish,
        &valid_setup(),
        &entry_ready(),
        Regime::Trending,
    );

    assert_eq!(verdict.signal, FinalSignal::StrongBuy);
    assert_eq!(verdict.confidence, 100.0);
    assert_eq!(verdict.gates.passed_count, 5);
    assert!(verdict.gates.reasons.is_empty());
}

#[test]
fn test_four_gates_is_buy() {
    let verdict = compose_signal(
        &confluence_at(75.0),
        TimeframeAlignment::Bullish,
        &valid_setup(),
        &entry_ready(),
        Regime::Ranging,
    );

    assert_eq!(verdict.signal, FinalSignal::Buy);
    assert_eq!(verdict.confidence, 80.0);
    assert!(!verdict.gates.regime_passed);
    assert_eq!(verdict.gates.reasons.len(), 1);
}

#[test]
fn test_three_gates_is_neutral() {
    let verdict = compose_signal(
        &confluence_at(75.0),
        TimeframeAlignment::Mixed,
        &valid_setup(),
        &entry_ready(),
        Regime::Ranging,
    );

    assert_eq!(verdict.signal, FinalSignal::Neutral);
    assert_eq!(verdict.gates.passed_count, 3);
}

#[test]
fn test_confluence_failure_skips_regardless() {
    // Everything else passes, but weak confluence is a hard stop.
    let verdict = compose_signal(
        &confluence_at(40.0),
        TimeframeAlignment::StrongBullish,
        &valid_setup(),
        &entry_ready(),
        Regime::Trending,
    );

    assert_eq!(verdict.signal, FinalSignal::Skip);
    assert_eq!(verdict.gates.passed_count, 4);
}

#[test]
fn test_bad_risk_reward_skips_regardless() {
    let mut setup = valid_setup();
    setup.is_valid = false;
    setup.risk_reward_ratio = 1.2;

    let verdict = compose_signal(
        &confluence_at(80.0),
        TimeframeAlignment::StrongBullish,
        &setup,
        &entry_ready(),
        Regime::Trending,
    );

    assert_eq!(verdict.signal, FinalSignal::Skip);
}

#[test]
fn test_no_entry_degrades_verdict() {
    let verdict = compose_signal(
        &confluence_at(75.0),
        TimeframeAlignment::Bullish,
        &valid_setup(),
        &entry_none(),
        Regime::Trending,
    );

    assert_eq!(verdict.signal, FinalSignal::Buy);
    assert!(!verdict.gates.entry_passed);
    assert!(verdict.gates.reasons[0].contains("nothing to take"));
}
