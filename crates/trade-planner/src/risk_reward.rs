use signal_core::{round2, round8, AnalysisError};

use crate::models::RiskRewardSetup;

/// Stop distance in ATR multiples
const STOP_ATR_MULTIPLE: f64 = 1.5;
/// Target distance in ATR multiples
const TARGET_ATR_MULTIPLE: f64 = 3.0;
/// Minimum reward:risk to call a setup valid
const MIN_RATIO: f64 = 2.0;

/// Account percentage put at risk per trade when the caller has no
/// explicit risk budget.
pub const DEFAULT_ACCOUNT_RISK_PERCENT: f64 = 2.0;

/// Derive stop/target levels for a long setup from the ATR heuristic and
/// the nearest support/resistance.
///
/// The clamps are directional: a stop that would land below support is
/// pulled up to just under it (tightening the risk), and a target that
/// would land short of resistance is pushed to just above it. Neither
/// clamp ever widens the stop.
pub fn plan_risk_reward(
    entry_price: f64,
    support: f64,
    resistance: f64,
    atr: f64,
    account_risk_percent: f64,
) -> Result<RiskRewardSetup, AnalysisError> {
    if !entry_price.is_finite() || entry_price <= 0.0 {
        return Err(AnalysisError::InvalidData(format!(
            "entry price must be positive, got {entry_price}"
        )));
    }
    if !atr.is_finite() || atr <= 0.0 {
        return Err(AnalysisError::InvalidData(format!(
            "ATR must be positive, got {atr}"
        )));
    }

    let mut stop_loss = entry_price - STOP_ATR_MULTIPLE * atr;
    if stop_loss < support {
        stop_loss = support * 0.99;
    }

    let mut take_profit = entry_price + TARGET_ATR_MULTIPLE * atr;
    if take_profit < resistance {
        take_profit = resistance * 1.01;
    }

    let risk = entry_price - stop_loss;
    let reward = take_profit - entry_price;
    if risk <= 0.0 {
        return Err(AnalysisError::InvalidData(format!(
            "support {support} leaves no room under entry {entry_price}"
        )));
    }

    let ratio = reward / risk;
    let potential_loss_percent = risk / entry_price * 100.0;
    let potential_gain_percent = reward / entry_price * 100.0;

    // Sizing multiplier from the risk budget; deliberately unbounded
    // above 100 (see RiskRewardSetup docs).
    let position_size = account_risk_percent / potential_loss_percent * 100.0;

    Ok(RiskRewardSetup {
        entry_price: round8(entry_price),
        take_profit: round8(take_profit),
        stop_loss: round8(stop_loss),
        risk_reward_ratio: round2(ratio),
        is_valid: ratio >= MIN_RATIO,
        position_size: round2(position_size),
        potential_gain_percent: round2(potential_gain_percent),
        potential_loss_percent: round2(potential_loss_percent),
    })
}
