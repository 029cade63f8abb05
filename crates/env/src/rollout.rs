//! Evaluation rollouts: drive one episode with a policy and record the trace.

use keeper_core::time::seconds_to_hours;
use keeper_orbits::PropagationEngine;
use serde::Serialize;
use tracing::{debug, info};

use crate::{Action, EnvError, Policy, StationKeepingEnv};

/// One recorded step of an evaluation episode.
#[derive(Debug, Clone, Serialize)]
pub struct RolloutStep {
    pub step_index: u64,
    pub elapsed_hours: f64,
    pub altitude_km: f64,
    pub altitude_error_km: f64,
    pub action: Action,
    pub reward: f64,
}

/// Full trace and outcome of an evaluation episode.
#[derive(Debug, Clone, Serialize)]
pub struct Rollout {
    pub policy: String,
    pub steps: Vec<RolloutStep>,
    pub terminated: bool,
    pub truncated: bool,
    pub total_reward: f64,
    pub thrust_count: u64,
    pub delta_v_spent_m_s: f64,
}

impl Rollout {
    pub fn final_altitude_km(&self) -> Option<f64> {
        self.steps.last().map(|s| s.altitude_km)
    }

    /// Fraction of steps that ended inside `±allowed_band_km`.
    pub fn in_band_fraction(&self, allowed_band_km: f64) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        let inside = self
            .steps
            .iter()
            .filter(|s| s.altitude_error_km.abs() <= allowed_band_km)
            .count();
        inside as f64 / self.steps.len() as f64
    }
}

/// Reset `env` and step it with `policy` until termination or truncation.
pub fn run_episode<E, P>(
    env: &mut StationKeepingEnv<E>,
    policy: &mut P,
    seed: Option<u64>,
) -> Result<Rollout, EnvError>
where
    E: PropagationEngine,
    P: Policy + ?Sized,
{
    let (mut observation, reset_info) = env.reset(seed)?;
    debug!(
        policy = policy.name(),
        episode_length = reset_info.episode_length,
        "rollout started"
    );
    let thrust_dv = env.config().thrust_delta_v_m_s;
    let mut rollout = Rollout {
        policy: policy.name().to_string(),
        steps: Vec::new(),
        terminated: false,
        truncated: false,
        total_reward: 0.0,
        thrust_count: 0,
        delta_v_spent_m_s: 0.0,
    };

    loop {
        let action = policy.act(&observation);
        let result = env.step(action)?;
        if result.info.thrust_applied {
            rollout.thrust_count += 1;
            rollout.delta_v_spent_m_s += thrust_dv;
        }
        rollout.total_reward += result.reward;
        rollout.steps.push(RolloutStep {
            step_index: result.info.step_index,
            elapsed_hours: seconds_to_hours(result.info.elapsed_s),
            altitude_km: result.info.altitude_km,
            altitude_error_km: result.observation.altitude_error_km,
            action,
            reward: result.reward,
        });
        observation = result.observation;

        if result.done() {
            rollout.terminated = result.terminated;
            rollout.truncated = result.truncated;
            break;
        }
    }

    info!(
        policy = %rollout.policy,
        steps = rollout.steps.len(),
        terminated = rollout.terminated,
        total_reward = rollout.total_reward,
        "rollout finished"
    );
    Ok(rollout)
}
