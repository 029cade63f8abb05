//! Reward shaping and failure detection.
//!
//! Pure functions of the post-step altitude error; the environment owns no
//! reward state.

use keeper_config::RewardConfig;
use serde::{Deserialize, Serialize};

/// Components of a single step's reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// In-band bonus or quadratic out-of-band penalty.
    pub base: f64,
    /// Fuel penalty (zero when coasting).
    pub fuel: f64,
    /// Set when the failure penalty replaced the shaped reward.
    pub failure_override: bool,
    pub total: f64,
}

/// Shaped reward for a step ending at `altitude_error_km`.
///
/// Inside the band the base reward is the flat bonus; outside it is
/// `-(error / band)²`, so small excursions cost little and large ones cost a lot.
pub fn shaped_reward(
    altitude_error_km: f64,
    allowed_band_km: f64,
    thrusted: bool,
    weights: &RewardConfig,
) -> RewardBreakdown {
    let base = if altitude_error_km.abs() <= allowed_band_km {
        weights.in_band_reward
    } else {
        let normalized = altitude_error_km / allowed_band_km;
        -(normalized * normalized)
    };
    let fuel = if thrusted { weights.fuel_penalty } else { 0.0 };
    RewardBreakdown {
        base,
        fuel,
        failure_override: false,
        total: base + fuel,
    }
}

/// Replace the shaped total with the failure penalty.
pub fn apply_failure(breakdown: RewardBreakdown, weights: &RewardConfig) -> RewardBreakdown {
    RewardBreakdown {
        failure_override: true,
        total: weights.failure_penalty,
        ..breakdown
    }
}

/// True when the satellite sits strictly below the critical altitude.
pub fn is_failure(altitude_km: f64, critical_altitude_km: f64) -> bool {
    altitude_km < critical_altitude_km
}
