//! Cartesian two-body orbit state and derived quantities.

use keeper_core::vector::{self, Vector3};

/// Eccentricity below which an orbit is treated as circular.
pub const CIRCULAR_ECCENTRICITY: f64 = 1e-10;

/// Inertial position/velocity of a satellite about a central body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
    /// Seconds since the state was created at its reference epoch.
    pub epoch_s: f64,
    pub mu_km3_s2: f64,
}

impl OrbitState {
    /// Equatorial circular orbit of radius `radius_km`, starting on the +x axis.
    pub fn circular(mu_km3_s2: f64, radius_km: f64) -> Self {
        let speed = (mu_km3_s2 / radius_km).sqrt();
        Self {
            position_km: [radius_km, 0.0, 0.0],
            velocity_km_s: [0.0, speed, 0.0],
            epoch_s: 0.0,
            mu_km3_s2,
        }
    }

    /// Distance from the body centre (km).
    pub fn radius_km(&self) -> f64 {
        vector::norm(&self.position_km)
    }

    pub fn speed_km_s(&self) -> f64 {
        vector::norm(&self.velocity_km_s)
    }

    /// Specific orbital energy (km²/s²).
    pub fn specific_energy(&self) -> f64 {
        let v = self.speed_km_s();
        0.5 * v * v - self.mu_km3_s2 / self.radius_km()
    }

    /// Semi-major axis from vis-viva (km). Infinite for parabolic states, negative for hyperbolic.
    pub fn semi_major_axis(&self) -> f64 {
        -self.mu_km3_s2 / (2.0 * self.specific_energy())
    }

    /// Specific angular momentum vector `r × v` (km²/s).
    pub fn angular_momentum(&self) -> Vector3 {
        vector::cross(&self.position_km, &self.velocity_km_s)
    }

    /// Eccentricity vector, pointing at periapsis.
    pub fn eccentricity_vector(&self) -> Vector3 {
        let h = self.angular_momentum();
        let v_cross_h = vector::cross(&self.velocity_km_s, &h);
        let r_hat = vector::scale(&self.position_km, 1.0 / self.radius_km());
        vector::sub(&vector::scale(&v_cross_h, 1.0 / self.mu_km3_s2), &r_hat)
    }

    pub fn eccentricity(&self) -> f64 {
        vector::norm(&self.eccentricity_vector())
    }

    /// Periapsis radius `h² / (μ (1 + e))` (km).
    ///
    /// Orbits with eccentricity below [`CIRCULAR_ECCENTRICITY`] report their
    /// instantaneous radius, which is exact for a freshly built circular state.
    pub fn periapsis_radius(&self) -> f64 {
        let e = self.eccentricity();
        if e < CIRCULAR_ECCENTRICITY {
            return self.radius_km();
        }
        let h = vector::norm(&self.angular_momentum());
        h * h / (self.mu_km3_s2 * (1.0 + e))
    }

    /// Unit vector along the velocity (in-track, prograde direction).
    pub fn prograde_unit(&self) -> Option<Vector3> {
        vector::unit(&self.velocity_km_s)
    }
}
