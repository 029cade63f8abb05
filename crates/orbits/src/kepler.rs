//! Two-body Keplerian engine using the universal-variable formulation.
//!
//! The universal anomaly χ is solved by Newton iteration on the universal
//! Kepler equation; Lagrange f/g coefficients then map the initial state to
//! the propagated one. Works for elliptic, parabolic and hyperbolic states.

use keeper_config::{BodyConfig, RadiusMeasure};
use keeper_core::vector::{self, Vector3};

use crate::{OrbitState, PropagationEngine, PropagationError};

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 100;

/// Stumpff functions `(C(z), S(z))`.
fn stumpff(z: f64) -> (f64, f64) {
    if z.abs() < 1e-3 {
        // Series: C = 1/2 - z/24 + z²/720, S = 1/6 - z/120 + z²/5040
        let c = 0.5 - z / 24.0 + z * z / 720.0 - z * z * z / 40_320.0;
        let s = 1.0 / 6.0 - z / 120.0 + z * z / 5_040.0 - z * z * z / 362_880.0;
        (c, s)
    } else if z > 0.0 {
        let sz = z.sqrt();
        ((1.0 - sz.cos()) / z, (sz - sz.sin()) / (sz * sz * sz))
    } else {
        let sz = (-z).sqrt();
        ((sz.cosh() - 1.0) / (-z), (sz.sinh() - sz) / (sz * sz * sz))
    }
}

/// Propagate a state by `dt_s` seconds under point-mass gravity.
pub fn propagate_universal(orbit: &OrbitState, dt_s: f64) -> Result<OrbitState, PropagationError> {
    if !dt_s.is_finite() {
        return Err(PropagationError::Degenerate("propagation duration is not finite"));
    }
    let mu = orbit.mu_km3_s2;
    if mu <= 0.0 || !mu.is_finite() {
        return Err(PropagationError::Degenerate("gravitational parameter must be positive"));
    }
    let r0_vec = orbit.position_km;
    let v0_vec = orbit.velocity_km_s;
    let r0 = vector::norm(&r0_vec);
    if r0 <= 0.0 || !r0.is_finite() {
        return Err(PropagationError::Degenerate("position vector has zero length"));
    }
    if dt_s == 0.0 {
        return Ok(*orbit);
    }

    let v0 = vector::norm(&v0_vec);
    let vr0 = vector::dot(&r0_vec, &v0_vec) / r0;
    let sqrt_mu = mu.sqrt();
    // Reciprocal of the semi-major axis; zero for parabolic motion.
    let alpha = 2.0 / r0 - v0 * v0 / mu;

    let mut chi = if alpha.abs() > 1e-12 {
        sqrt_mu * alpha.abs() * dt_s
    } else {
        sqrt_mu * dt_s / r0
    };

    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let chi2 = chi * chi;
        let z = alpha * chi2;
        let (c, s) = stumpff(z);
        let f = r0 * vr0 / sqrt_mu * chi2 * c + (1.0 - alpha * r0) * chi2 * chi * s + r0 * chi
            - sqrt_mu * dt_s;
        let df = r0 * vr0 / sqrt_mu * chi * (1.0 - z * s) + (1.0 - alpha * r0) * chi2 * c + r0;
        let ratio = f / df;
        chi -= ratio;
        if !chi.is_finite() {
            break;
        }
        if ratio.abs() <= TOLERANCE * chi.abs().max(1.0) {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(PropagationError::NonConvergence {
            iterations: MAX_ITERATIONS,
        });
    }

    let chi2 = chi * chi;
    let z = alpha * chi2;
    let (c, s) = stumpff(z);

    let f = 1.0 - chi2 / r0 * c;
    let g = dt_s - chi2 * chi / sqrt_mu * s;
    let r_vec = vector::add(&vector::scale(&r0_vec, f), &vector::scale(&v0_vec, g));
    let r = vector::norm(&r_vec);

    let f_dot = sqrt_mu / (r * r0) * (alpha * chi2 * chi * s - chi);
    let g_dot = 1.0 - chi2 / r * c;
    let v_vec = vector::add(&vector::scale(&r0_vec, f_dot), &vector::scale(&v0_vec, g_dot));

    Ok(OrbitState {
        position_km: r_vec,
        velocity_km_s: v_vec,
        epoch_s: orbit.epoch_s + dt_s,
        mu_km3_s2: mu,
    })
}

/// Reference engine: exact two-body motion with configurable radius reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeplerEngine {
    pub radius_measure: RadiusMeasure,
}

impl KeplerEngine {
    pub fn new(radius_measure: RadiusMeasure) -> Self {
        Self { radius_measure }
    }
}

impl PropagationEngine for KeplerEngine {
    fn circular_orbit(&self, body: &BodyConfig, altitude_km: f64) -> OrbitState {
        OrbitState::circular(body.mu_km3_s2, body.radius_km + altitude_km)
    }

    fn apply_velocity_impulse(
        &self,
        orbit: &OrbitState,
        delta_v_km_s: Vector3,
    ) -> Result<OrbitState, PropagationError> {
        if delta_v_km_s.iter().any(|c| !c.is_finite()) {
            return Err(PropagationError::Degenerate("impulse is not finite"));
        }
        Ok(OrbitState {
            velocity_km_s: vector::add(&orbit.velocity_km_s, &delta_v_km_s),
            ..*orbit
        })
    }

    fn advance(&self, orbit: &OrbitState, duration_s: f64) -> Result<OrbitState, PropagationError> {
        propagate_universal(orbit, duration_s)
    }

    fn radius(&self, orbit: &OrbitState) -> f64 {
        match self.radius_measure {
            RadiusMeasure::Periapsis => orbit.periapsis_radius(),
            RadiusMeasure::SemiMajorAxis => orbit.semi_major_axis(),
            RadiusMeasure::Instantaneous => orbit.radius_km(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_core::constants::{EARTH_RADIUS_KM, MU_EARTH_KM3_S2};
    use std::f64::consts::PI;

    fn leo() -> OrbitState {
        OrbitState::circular(MU_EARTH_KM3_S2, EARTH_RADIUS_KM + 400.0)
    }

    #[test]
    fn stumpff_branches_agree_near_zero() {
        let (c_pos, s_pos) = stumpff(1.001e-3);
        let (c_ser, s_ser) = stumpff(0.999e-3);
        assert!((c_pos - c_ser).abs() < 1e-6);
        assert!((s_pos - s_ser).abs() < 1e-6);
        let (c_neg, s_neg) = stumpff(-1.001e-3);
        assert!((c_neg - c_ser).abs() < 1e-6);
        assert!((s_neg - s_ser).abs() < 1e-6);
    }

    #[test]
    fn circular_orbit_keeps_radius_while_coasting() {
        let orbit = leo();
        let later = propagate_universal(&orbit, 600.0).expect("propagate");
        assert!((later.radius_km() - orbit.radius_km()).abs() < 1e-6);
        assert!((later.speed_km_s() - orbit.speed_km_s()).abs() < 1e-9);
        assert_eq!(later.epoch_s, 600.0);
        // 600 s covers about 0.0678 rad of a 92.6 min orbit
        let angle = later.position_km[1].atan2(later.position_km[0]);
        let mean_motion = (MU_EARTH_KM3_S2 / orbit.radius_km().powi(3)).sqrt();
        assert!((angle - mean_motion * 600.0).abs() < 1e-8);
    }

    #[test]
    fn full_period_returns_to_start() {
        let mut orbit = leo();
        orbit.velocity_km_s[1] += 0.05;
        let a = orbit.semi_major_axis();
        let period = 2.0 * PI * (a.powi(3) / MU_EARTH_KM3_S2).sqrt();
        let back = propagate_universal(&orbit, period).expect("propagate");
        for i in 0..3 {
            assert!((back.position_km[i] - orbit.position_km[i]).abs() < 1e-4);
            assert!((back.velocity_km_s[i] - orbit.velocity_km_s[i]).abs() < 1e-7);
        }
    }

    #[test]
    fn hyperbolic_state_conserves_energy() {
        let mut orbit = leo();
        orbit.velocity_km_s[1] = 12.0;
        let later = propagate_universal(&orbit, 3_600.0).expect("propagate");
        assert!((later.specific_energy() - orbit.specific_energy()).abs() < 1e-6);
        assert!(later.radius_km() > orbit.radius_km());
    }

    #[test]
    fn rejects_degenerate_states() {
        let mut orbit = leo();
        orbit.position_km = [0.0, 0.0, 0.0];
        assert!(matches!(
            propagate_universal(&orbit, 10.0),
            Err(PropagationError::Degenerate(_))
        ));
        assert!(matches!(
            propagate_universal(&leo(), f64::NAN),
            Err(PropagationError::Degenerate(_))
        ));
    }

    #[test]
    fn engine_radius_measures_differ_after_prograde_burn() {
        let body = BodyConfig::earth();
        let periapsis = KeplerEngine::new(RadiusMeasure::Periapsis);
        let sma = KeplerEngine::new(RadiusMeasure::SemiMajorAxis);
        let orbit = periapsis.circular_orbit(&body, 400.0);
        let dv = vector::scale(&orbit.prograde_unit().unwrap(), 0.001);
        let burned = periapsis.apply_velocity_impulse(&orbit, dv).unwrap();

        let r0 = body.radius_km + 400.0;
        assert!((periapsis.radius(&burned) - r0).abs() < 1e-6);
        assert!(sma.radius(&burned) - r0 > 1.7);
        assert_eq!(burned.position_km, orbit.position_km);
    }
}
