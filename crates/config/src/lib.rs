//! Configuration models and loaders for the station-keeping environment.

use std::fs::File;
use std::path::{Path, PathBuf};

use keeper_core::constants::{EARTH_RADIUS_KM, MU_EARTH_KM3_S2};
use keeper_core::time::days_to_seconds;
use keeper_core::units::ms_to_kms;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest episode, in steps, a configuration may describe.
pub const MAX_EPISODE_LENGTH: u64 = 1_000_000_000;

/// Central body the satellite orbits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
}

impl BodyConfig {
    pub fn earth() -> Self {
        Self {
            name: "EARTH".to_string(),
            mu_km3_s2: MU_EARTH_KM3_S2,
            radius_km: EARTH_RADIUS_KM,
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self::earth()
    }
}

/// Reward shaping constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward granted for a step that ends inside the tolerance band.
    pub in_band_reward: f64,
    /// Added to the reward whenever the thruster fires.
    pub fuel_penalty: f64,
    /// Replaces the whole step reward when the critical altitude is crossed.
    pub failure_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            in_band_reward: 1.0,
            fuel_penalty: -0.1,
            failure_penalty: -100.0,
        }
    }
}

/// Which orbital radius the propagation engine reports as "the" radius of an orbit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusMeasure {
    /// Closest-approach radius.
    #[default]
    Periapsis,
    /// Mean radius of the osculating ellipse.
    SemiMajorAxis,
    /// Current distance from the body centre.
    Instantaneous,
}

/// Immutable environment parameters fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub target_altitude_km: f64,
    pub allowed_band_km: f64,
    pub critical_altitude_km: f64,
    pub thrust_delta_v_m_s: f64,
    pub time_step_s: f64,
    pub decay_per_step_km: f64,
    pub mission_duration_days: f64,
    pub body: BodyConfig,
    pub reward: RewardConfig,
    pub radius_measure: RadiusMeasure,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            target_altitude_km: 400.0,
            allowed_band_km: 5.0,
            critical_altitude_km: 250.0,
            thrust_delta_v_m_s: 1.0,
            time_step_s: 600.0,
            decay_per_step_km: 0.01,
            mission_duration_days: 30.0,
            body: BodyConfig::earth(),
            reward: RewardConfig::default(),
            radius_measure: RadiusMeasure::Periapsis,
        }
    }
}

impl EnvConfig {
    /// Maximum number of steps before an episode is truncated.
    pub fn episode_length(&self) -> u64 {
        (days_to_seconds(self.mission_duration_days) / self.time_step_s).floor() as u64
    }

    /// Target orbit radius measured from the body centre (km).
    pub fn target_radius_km(&self) -> f64 {
        self.body.radius_km + self.target_altitude_km
    }

    /// Thrust impulse magnitude in km/s.
    pub fn thrust_delta_v_km_s(&self) -> f64 {
        ms_to_kms(self.thrust_delta_v_m_s)
    }

    /// Check the construction invariants, failing on the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("target_altitude_km", self.target_altitude_km),
            ("allowed_band_km", self.allowed_band_km),
            ("critical_altitude_km", self.critical_altitude_km),
            ("thrust_delta_v_m_s", self.thrust_delta_v_m_s),
            ("time_step_s", self.time_step_s),
            ("decay_per_step_km", self.decay_per_step_km),
            ("mission_duration_days", self.mission_duration_days),
            ("body.mu_km3_s2", self.body.mu_km3_s2),
            ("body.radius_km", self.body.radius_km),
            ("reward.in_band_reward", self.reward.in_band_reward),
            ("reward.fuel_penalty", self.reward.fuel_penalty),
            ("reward.failure_penalty", self.reward.failure_penalty),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite")));
        }

        if self.critical_altitude_km >= self.target_altitude_km {
            return Err(invalid(format!(
                "critical altitude {} km must lie below target altitude {} km",
                self.critical_altitude_km, self.target_altitude_km
            )));
        }
        if self.allowed_band_km <= 0.0 {
            return Err(invalid("allowed band must be positive"));
        }
        let margin = self.target_altitude_km - self.critical_altitude_km;
        if self.allowed_band_km >= margin {
            return Err(invalid(format!(
                "allowed band {} km must be narrower than the {} km failure margin",
                self.allowed_band_km, margin
            )));
        }
        if self.thrust_delta_v_m_s <= 0.0 {
            return Err(invalid("thrust delta-v must be positive"));
        }
        if self.time_step_s <= 0.0 {
            return Err(invalid("time step must be positive"));
        }
        if self.decay_per_step_km < 0.0 {
            return Err(invalid("decay per step must not be negative"));
        }
        let steps = (days_to_seconds(self.mission_duration_days) / self.time_step_s).floor();
        if !steps.is_finite() || steps > MAX_EPISODE_LENGTH as f64 {
            return Err(invalid(format!(
                "mission spans more than {MAX_EPISODE_LENGTH} time steps"
            )));
        }
        if self.mission_duration_days <= 0.0 || self.episode_length() == 0 {
            return Err(invalid(
                "mission duration must cover at least one time step",
            ));
        }
        if self.body.mu_km3_s2 <= 0.0 {
            return Err(invalid("body gravitational parameter must be positive"));
        }
        if self.body.radius_km <= 0.0 {
            return Err(invalid("body radius must be positive"));
        }
        Ok(())
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("no TOML configuration found in {0}")]
    Empty(PathBuf),
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Load and validate an environment configuration.
///
/// Accepts a `.toml` file, a YAML file, or a directory whose first `.toml`
/// entry (in sorted order) is used. Missing fields take their defaults.
pub fn load_env_config<P: AsRef<Path>>(path: P) -> Result<EnvConfig, ConfigError> {
    let config: EnvConfig = load_record(path)?;
    config.validate()?;
    Ok(config)
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_record(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_record<T>(dir: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    let first = entries
        .into_iter()
        .next()
        .ok_or_else(|| ConfigError::Empty(dir.to_path_buf()))?;
    let contents = std::fs::read_to_string(&first)?;
    Ok(toml::from_str(&contents)?)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_thirty_day_mission() {
        let config = EnvConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.episode_length(), 4320);
        assert!((config.thrust_delta_v_km_s() - 0.001).abs() < 1e-15);
        assert!((config.target_radius_km() - 6778.1366).abs() < 1e-9);
    }

    #[test]
    fn rejects_critical_above_target() {
        let config = EnvConfig {
            critical_altitude_km: 450.0,
            ..EnvConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_band_wider_than_margin() {
        let config = EnvConfig {
            allowed_band_km: 150.0,
            ..EnvConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_non_positive_thrust_and_time_step() {
        for config in [
            EnvConfig {
                thrust_delta_v_m_s: 0.0,
                ..EnvConfig::default()
            },
            EnvConfig {
                thrust_delta_v_m_s: -1.0,
                ..EnvConfig::default()
            },
            EnvConfig {
                time_step_s: 0.0,
                ..EnvConfig::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn rejects_nan_fields() {
        let config = EnvConfig {
            decay_per_step_km: f64::NAN,
            ..EnvConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decay_per_step_km"));
    }

    #[test]
    fn rejects_missions_with_unrepresentable_length() {
        let config = EnvConfig {
            mission_duration_days: 1e300,
            ..EnvConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("time steps"), "{err}");

        let tiny_step = EnvConfig {
            time_step_s: 1e-300,
            ..EnvConfig::default()
        };
        assert!(matches!(tiny_step.validate(), Err(ConfigError::Invalid(_))));

        let at_cap = EnvConfig {
            mission_duration_days: 1e9 * 600.0 / 86_400.0,
            ..EnvConfig::default()
        };
        assert!(at_cap.validate().is_ok());
        assert!(at_cap.episode_length() <= MAX_EPISODE_LENGTH);
    }

    #[test]
    fn rejects_mission_shorter_than_one_step() {
        let config = EnvConfig {
            mission_duration_days: 0.001,
            time_step_s: 600.0,
            ..EnvConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn loads_partial_toml_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("env.toml");
        let mut file = File::create(&path).expect("create");
        writeln!(
            file,
            "decay_per_step_km = 0.5\nradius_measure = \"semi_major_axis\"\n\n[reward]\nfuel_penalty = -0.25"
        )
        .unwrap();

        let config = load_env_config(&path).expect("load toml");
        assert_eq!(config.decay_per_step_km, 0.5);
        assert_eq!(config.radius_measure, RadiusMeasure::SemiMajorAxis);
        assert_eq!(config.reward.fuel_penalty, -0.25);
        assert_eq!(config.reward.failure_penalty, -100.0);
        assert_eq!(config.target_altitude_km, 400.0);
    }

    #[test]
    fn loads_yaml_and_directory_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        let yaml = dir.path().join("env.yaml");
        std::fs::write(
            &yaml,
            "target_altitude_km: 500.0\nbody:\n  name: MARS\n  mu_km3_s2: 42828.37\n  radius_km: 3389.5\n",
        )
        .unwrap();
        let config = load_env_config(&yaml).expect("load yaml");
        assert_eq!(config.body.name, "MARS");
        assert_eq!(config.target_altitude_km, 500.0);

        let configs = dir.path().join("configs");
        std::fs::create_dir(&configs).unwrap();
        assert!(matches!(
            load_env_config(&configs),
            Err(ConfigError::Empty(_))
        ));
        std::fs::write(configs.join("b.toml"), "time_step_s = 60.0\n").unwrap();
        std::fs::write(configs.join("a.toml"), "time_step_s = 300.0\n").unwrap();
        let config = load_env_config(&configs).expect("load dir");
        assert_eq!(config.time_step_s, 300.0);
    }

    #[test]
    fn invalid_file_fails_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "thrust_delta_v_m_s = -2.0\n").unwrap();
        assert!(matches!(
            load_env_config(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
