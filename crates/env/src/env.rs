//! Episode state machine.

use std::sync::Arc;

use keeper_config::EnvConfig;
use keeper_core::vector;
use keeper_orbits::{OrbitState, PropagationEngine, PropagationError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::reward::{self, RewardBreakdown};
use crate::spaces::{self, BoxSpace, Discrete};
use crate::{Action, EnvError, Environment, Observation};

/// Metadata returned from [`StationKeepingEnv::reset`].
#[derive(Debug, Clone, Serialize)]
pub struct ResetInfo {
    /// Seed passed by the caller. Reset is deterministic, so it is only recorded.
    pub seed: Option<u64>,
    pub episode_length: u64,
}

/// Metadata returned alongside every step.
#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    pub step_index: u64,
    /// Altitude above the body's surface after the step (km).
    pub altitude_km: f64,
    pub elapsed_s: f64,
    pub thrust_applied: bool,
    pub reward: RewardBreakdown,
}

/// Outcome of a single environment step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    /// Critical altitude crossed: mission failure.
    pub terminated: bool,
    /// Time budget exhausted without failure.
    pub truncated: bool,
    pub info: StepInfo,
}

impl StepResult {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[derive(Debug, Clone, Copy)]
struct Episode {
    orbit: OrbitState,
    step_index: u64,
}

#[derive(Debug, Clone, Copy)]
enum EpisodeState {
    Unstarted,
    Ready(Episode),
    Terminal(Episode),
}

/// Station-keeping environment over a pluggable propagation engine.
#[derive(Debug)]
pub struct StationKeepingEnv<E> {
    config: Arc<EnvConfig>,
    engine: E,
    episode_length: u64,
    state: EpisodeState,
}

impl<E: PropagationEngine> StationKeepingEnv<E> {
    /// Validate `config` and build an environment that has not been reset yet.
    pub fn new(config: EnvConfig, engine: E) -> Result<Self, EnvError> {
        Self::with_shared(Arc::new(config), engine)
    }

    /// Build an environment over a configuration shared with other instances.
    pub fn with_shared(config: Arc<EnvConfig>, engine: E) -> Result<Self, EnvError> {
        config.validate()?;
        let episode_length = config.episode_length();
        Ok(Self {
            config,
            engine,
            episode_length,
            state: EpisodeState::Unstarted,
        })
    }

    pub fn config(&self) -> &Arc<EnvConfig> {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn episode_length(&self) -> u64 {
        self.episode_length
    }

    /// Steps taken since the last reset (zero before the first reset).
    pub fn step_index(&self) -> u64 {
        self.episode().map(|ep| ep.step_index).unwrap_or(0)
    }

    /// Current orbit, if an episode has been started.
    pub fn orbit(&self) -> Option<&OrbitState> {
        self.episode().map(|ep| &ep.orbit)
    }

    /// Current altitude above the body's surface, as measured by the engine.
    pub fn altitude_km(&self) -> Option<f64> {
        self.orbit()
            .map(|orbit| self.engine.radius(orbit) - self.config.body.radius_km)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, EpisodeState::Terminal(_))
    }

    fn episode(&self) -> Option<&Episode> {
        match &self.state {
            EpisodeState::Unstarted => None,
            EpisodeState::Ready(ep) | EpisodeState::Terminal(ep) => Some(ep),
        }
    }

    /// Start a new episode on a circular orbit at the target altitude.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, ResetInfo), EnvError> {
        let orbit = self
            .engine
            .circular_orbit(&self.config.body, self.config.target_altitude_km);
        self.state = EpisodeState::Ready(Episode {
            orbit,
            step_index: 0,
        });
        info!(
            target_altitude_km = self.config.target_altitude_km,
            episode_length = self.episode_length,
            ?seed,
            "episode reset"
        );

        let observation = Observation {
            altitude_error_km: 0.0,
            decay_rate_km: self.config.decay_per_step_km,
        };
        Ok((
            observation,
            ResetInfo {
                seed,
                episode_length: self.episode_length,
            },
        ))
    }

    /// Step with the integer action encoding used by trainers.
    pub fn step_raw(&mut self, action: i64) -> Result<StepResult, EnvError> {
        self.step(Action::try_from(action)?)
    }

    /// Advance the episode by one decision step.
    ///
    /// The episode state is only committed once every propagation call has
    /// succeeded, so an engine error leaves the episode where it was.
    pub fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        let mut episode = match self.state {
            EpisodeState::Unstarted => return Err(EnvError::NotReset),
            EpisodeState::Terminal(_) => return Err(EnvError::EpisodeFinished),
            EpisodeState::Ready(episode) => episode,
        };
        let config = &*self.config;
        let body_radius = config.body.radius_km;

        episode.step_index += 1;

        let thrusted = action.is_thrust();
        let mut orbit = episode.orbit;
        if thrusted {
            let prograde = orbit
                .prograde_unit()
                .ok_or(PropagationError::Degenerate("orbit has zero velocity"))?;
            let delta_v = vector::scale(&prograde, config.thrust_delta_v_km_s());
            orbit = self.engine.apply_velocity_impulse(&orbit, delta_v)?;
        }

        let radius_before = self.engine.radius(&orbit);
        // Collapses back to a circular orbit, dropping any eccentricity from the burn.
        let new_altitude = ((radius_before - body_radius) - config.decay_per_step_km).max(0.0);
        orbit = self.engine.circular_orbit(&config.body, new_altitude);
        orbit = self.engine.advance(&orbit, config.time_step_s)?;

        // Rounding in the engine must not report a floored orbit below the surface.
        let current_radius = self.engine.radius(&orbit).max(body_radius);
        let altitude_km = current_radius - body_radius;
        let observation = Observation {
            altitude_error_km: current_radius - config.target_radius_km(),
            decay_rate_km: radius_before - current_radius,
        };

        let mut breakdown = reward::shaped_reward(
            observation.altitude_error_km,
            config.allowed_band_km,
            thrusted,
            &config.reward,
        );
        let terminated = reward::is_failure(altitude_km, config.critical_altitude_km);
        if terminated {
            breakdown = reward::apply_failure(breakdown, &config.reward);
            warn!(
                step = episode.step_index,
                altitude_km, "critical altitude crossed, episode terminated"
            );
        }
        let truncated = episode.step_index >= self.episode_length;
        if truncated {
            info!(step = episode.step_index, altitude_km, "time budget exhausted");
        }

        debug!(
            step = episode.step_index,
            ?action,
            altitude_km,
            altitude_error_km = observation.altitude_error_km,
            reward = breakdown.total,
            "step"
        );

        episode.orbit = orbit;
        self.state = if terminated || truncated {
            EpisodeState::Terminal(episode)
        } else {
            EpisodeState::Ready(episode)
        };

        Ok(StepResult {
            observation,
            reward: breakdown.total,
            terminated,
            truncated,
            info: StepInfo {
                step_index: episode.step_index,
                altitude_km,
                elapsed_s: episode.step_index as f64 * config.time_step_s,
                thrust_applied: thrusted,
                reward: breakdown,
            },
        })
    }
}

impl<E: PropagationEngine> Environment for StationKeepingEnv<E> {
    type Action = Action;
    type Observation = Observation;

    fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, ResetInfo), EnvError> {
        StationKeepingEnv::reset(self, seed)
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        StationKeepingEnv::step(self, action)
    }

    fn action_space(&self) -> Discrete {
        spaces::station_keeping_actions()
    }

    fn observation_space(&self) -> BoxSpace<2> {
        spaces::station_keeping_observations()
    }
}
