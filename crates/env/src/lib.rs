//! Station-keeping control environment.
//!
//! An external trainer calls [`StationKeepingEnv::reset`] once per episode and
//! then feeds actions to [`StationKeepingEnv::step`] until the episode is
//! terminated (critical altitude crossed) or truncated (time budget spent).

pub mod action;
pub mod env;
pub mod policy;
pub mod reward;
pub mod rollout;
pub mod spaces;

use keeper_config::ConfigError;
use keeper_orbits::PropagationError;
use thiserror::Error;

pub use action::{Action, Observation};
pub use env::{ResetInfo, StationKeepingEnv, StepInfo, StepResult};
pub use policy::{CoastPolicy, Policy, ThresholdPolicy};
pub use reward::RewardBreakdown;
pub use rollout::{Rollout, RolloutStep, run_episode};
pub use spaces::{BoxSpace, Discrete};

/// Errors raised by the environment.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid environment configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("propagation failed: {0}")]
    Propagation(#[from] PropagationError),
    #[error("step called before reset")]
    NotReset,
    #[error("step called on a finished episode; call reset first")]
    EpisodeFinished,
    #[error("action {0} is outside the action space {{0, 1}}")]
    InvalidAction(i64),
}

/// Gym-style contract between an environment and the policy trainer driving it.
pub trait Environment {
    type Action;
    type Observation;

    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Observation, ResetInfo), EnvError>;

    fn step(&mut self, action: Self::Action) -> Result<StepResult, EnvError>;

    fn action_space(&self) -> Discrete;

    fn observation_space(&self) -> BoxSpace<2>;
}
