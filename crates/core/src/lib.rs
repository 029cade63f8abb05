//! Core units, constants, and shared primitives for the Station Keeper workspace.

/// Physical constants. Distances in kilometres, times in seconds.
pub mod constants {
    /// Earth gravitational parameter (km³/s²).
    pub const MU_EARTH_KM3_S2: f64 = 398_600.441_8;
    /// Earth equatorial radius (km).
    pub const EARTH_RADIUS_KM: f64 = 6_378.136_6;
    /// Seconds per day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
}

/// Unit conversion helpers. Thrust is configured in m/s, propagation runs in km/s.
pub mod units {
    #[inline]
    pub fn ms_to_kms(v: f64) -> f64 {
        v / 1_000.0
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to hours.
    #[inline]
    pub fn seconds_to_hours(seconds: f64) -> f64 {
        seconds / SECONDS_PER_HOUR
    }
}

/// Inertial-frame vector arithmetic used by orbit states and impulses.
pub mod vector {
    /// Position (km) or velocity (km/s) in the body-centred inertial frame.
    pub type Vector3 = [f64; 3];

    /// Magnitude, e.g. orbit radius from a position vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        v.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Component-wise sum, e.g. a velocity plus an impulsive delta-v.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        std::array::from_fn(|i| a[i] + b[i])
    }

    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        std::array::from_fn(|i| a[i] - b[i])
    }

    /// Multiply every component by `s`.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        v.map(|c| c * s)
    }

    /// Unit vector along `v`, or `None` for a zero-length input.
    #[inline]
    pub fn unit(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        if n > 0.0 && n.is_finite() {
            Some(scale(v, 1.0 / n))
        } else {
            None
        }
    }
}
