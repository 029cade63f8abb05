//! Controllers that map observations to thruster decisions.

use crate::{Action, Observation};

/// Anything that can choose an action from an observation.
pub trait Policy {
    fn act(&mut self, observation: &Observation) -> Action;

    /// Short label used in logs and exported summaries.
    fn name(&self) -> &str;
}

/// Never fires the thruster.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoastPolicy;

impl Policy for CoastPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        Action::Coast
    }

    fn name(&self) -> &str {
        "coast"
    }
}

/// Fires whenever the satellite has sunk more than `fire_below_km` under the target.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy {
    pub fire_below_km: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self { fire_below_km: 2.5 }
    }
}

impl Policy for ThresholdPolicy {
    fn act(&mut self, observation: &Observation) -> Action {
        if observation.altitude_error_km < -self.fire_below_km {
            Action::Thrust
        } else {
            Action::Coast
        }
    }

    fn name(&self) -> &str {
        "threshold"
    }
}
