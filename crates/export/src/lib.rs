//! Export helpers for rollout traces (CSV) and summaries (JSON).

use thiserror::Error;

/// Errors raised while writing export artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod trace {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    use keeper_env::Rollout;
    use serde::Serialize;

    use crate::ExportError;

    pub const HEADER: [&str; 6] = [
        "step_index",
        "elapsed_hours",
        "altitude_km",
        "altitude_error_km",
        "action",
        "reward",
    ];

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    #[derive(Serialize)]
    struct Row {
        step_index: u64,
        elapsed_hours: f64,
        altitude_km: f64,
        altitude_error_km: f64,
        action: i64,
        reward: f64,
    }

    /// Write one CSV row per step, preceded by [`HEADER`].
    pub fn write_rollout<W: Write>(writer: W, rollout: &Rollout) -> Result<(), ExportError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(HEADER)?;
        for step in &rollout.steps {
            csv.serialize(Row {
                step_index: step.step_index,
                elapsed_hours: step.elapsed_hours,
                altitude_km: step.altitude_km,
                altitude_error_km: step.altitude_error_km,
                action: step.action.index(),
                reward: step.reward,
            })?;
        }
        csv.flush()?;
        Ok(())
    }
}

pub mod summary {
    use std::fs::{self, File};
    use std::path::Path;

    use keeper_config::EnvConfig;
    use keeper_env::Rollout;
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    use crate::ExportError;

    /// Outcome of an evaluation episode, echoed with the configuration that produced it.
    #[derive(Debug, Serialize)]
    pub struct RolloutSummary<'a> {
        pub policy: &'a str,
        pub steps: usize,
        pub terminated: bool,
        pub truncated: bool,
        pub total_reward: f64,
        pub thrust_count: u64,
        pub delta_v_spent_m_s: f64,
        pub final_altitude_km: Option<f64>,
        pub in_band_fraction: f64,
        pub config: &'a EnvConfig,
    }

    impl<'a> RolloutSummary<'a> {
        pub fn new(rollout: &'a Rollout, config: &'a EnvConfig) -> Self {
            Self {
                policy: &rollout.policy,
                steps: rollout.steps.len(),
                terminated: rollout.terminated,
                truncated: rollout.truncated,
                total_reward: rollout.total_reward,
                thrust_count: rollout.thrust_count,
                delta_v_spent_m_s: rollout.delta_v_spent_m_s,
                final_altitude_km: rollout.final_altitude_km(),
                in_band_fraction: rollout.in_band_fraction(config.allowed_band_km),
                config,
            }
        }
    }

    /// Write the summary as pretty JSON, creating parent directories as needed.
    pub fn write_summary(path: &Path, summary: &RolloutSummary<'_>) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        to_writer_pretty(File::create(path)?, summary)?;
        Ok(())
    }
}
