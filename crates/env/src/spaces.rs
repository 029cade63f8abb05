//! Declared action and observation spaces.

/// Finite set of integer actions `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discrete {
    pub n: u32,
}

impl Discrete {
    pub fn contains(&self, value: i64) -> bool {
        (0..i64::from(self.n)).contains(&value)
    }
}

/// Axis-aligned box of real-valued observations. Bounds are advisory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpace<const N: usize> {
    pub low: [f64; N],
    pub high: [f64; N],
}

impl<const N: usize> BoxSpace<N> {
    pub fn contains(&self, value: &[f64; N]) -> bool {
        value
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .all(|(v, (lo, hi))| (*lo..=*hi).contains(v))
    }
}

/// Two actions: coast and thrust.
pub fn station_keeping_actions() -> Discrete {
    Discrete { n: 2 }
}

/// Altitude error within ±200 km, decay rate within ±1 km.
pub fn station_keeping_observations() -> BoxSpace<2> {
    BoxSpace {
        low: [-200.0, -1.0],
        high: [200.0, 1.0],
    }
}
