//! Orbit state and the propagation-engine boundary used by the environment.
//!
//! The environment never manipulates orbital elements directly. Everything it
//! needs (circular orbits, impulsive burns, coasting, radius) goes through the
//! [`PropagationEngine`] trait so alternative engines can be swapped in.

pub mod kepler;
pub mod state;

use keeper_config::BodyConfig;
use keeper_core::vector::Vector3;
use thiserror::Error;

pub use kepler::{KeplerEngine, propagate_universal};
pub use state::OrbitState;

/// Errors surfaced by a propagation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error("kepler solver did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
    #[error("degenerate orbit state: {0}")]
    Degenerate(&'static str),
}

/// Operations the station-keeping environment consumes from an orbital-mechanics engine.
pub trait PropagationEngine {
    /// Circular orbit at `altitude_km` above the body's surface.
    fn circular_orbit(&self, body: &BodyConfig, altitude_km: f64) -> OrbitState;

    /// Apply an instantaneous velocity change (inertial frame, km/s).
    fn apply_velocity_impulse(
        &self,
        orbit: &OrbitState,
        delta_v_km_s: Vector3,
    ) -> Result<OrbitState, PropagationError>;

    /// Coast the orbit forward by `duration_s` seconds.
    fn advance(&self, orbit: &OrbitState, duration_s: f64) -> Result<OrbitState, PropagationError>;

    /// Orbit radius (km) as the engine defines it.
    fn radius(&self, orbit: &OrbitState) -> f64;
}
