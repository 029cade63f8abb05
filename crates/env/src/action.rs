//! Action and observation types exchanged with the trainer.

use serde::{Deserialize, Serialize};

use crate::EnvError;

/// Thruster decision for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Coast,
    Thrust,
}

impl Action {
    /// Integer encoding used by the discrete action space.
    pub fn index(self) -> i64 {
        match self {
            Self::Coast => 0,
            Self::Thrust => 1,
        }
    }

    pub fn is_thrust(self) -> bool {
        matches!(self, Self::Thrust)
    }
}

impl TryFrom<i64> for Action {
    type Error = EnvError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Coast),
            1 => Ok(Self::Thrust),
            other => Err(EnvError::InvalidAction(other)),
        }
    }
}

/// What the controller sees after each step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Current radius minus target radius (km).
    pub altitude_error_km: f64,
    /// Radius lost during the most recent step (km).
    pub decay_rate_km: f64,
}

impl Observation {
    pub fn to_array(&self) -> [f32; 2] {
        [self.altitude_error_km as f32, self.decay_rate_km as f32]
    }
}
