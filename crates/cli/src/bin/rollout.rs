use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use station_keeper::config::{EnvConfig, load_env_config};
use station_keeper::env::{CoastPolicy, Policy, StationKeepingEnv, ThresholdPolicy, run_episode};
use station_keeper::export::{summary, trace};
use station_keeper::orbits::KeplerEngine;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Run one station-keeping evaluation episode with a baseline policy"
)]
struct Cli {
    /// Environment configuration (TOML, YAML, or directory of TOML files)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Controller driving the thruster
    #[arg(long, value_enum, default_value_t = PolicyKind::Threshold)]
    policy: PolicyKind,

    /// Altitude deficit (km) below target at which the threshold policy fires
    #[arg(long, default_value_t = 2.5)]
    threshold_km: f64,

    /// Seed recorded with the episode
    #[arg(long)]
    seed: Option<u64>,

    /// Write the per-step trace as CSV (`-` for stdout)
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Write a JSON summary sidecar
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum PolicyKind {
    Coast,
    Threshold,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let config = load_env_config(path)?;
            tracing::info!(path = %path.display(), "loaded configuration");
            config
        }
        None => EnvConfig::default(),
    };

    let engine = KeplerEngine::new(config.radius_measure);
    let mut env = StationKeepingEnv::new(config, engine)?;
    let mut policy: Box<dyn Policy> = match cli.policy {
        PolicyKind::Coast => Box::new(CoastPolicy),
        PolicyKind::Threshold => Box::new(ThresholdPolicy {
            fire_below_km: cli.threshold_km,
        }),
    };

    let rollout = run_episode(&mut env, policy.as_mut(), cli.seed)?;
    let config = env.config();
    let outcome = if rollout.terminated {
        "FAILED (critical altitude crossed)"
    } else {
        "completed (time budget exhausted)"
    };

    if cli.trace.as_deref() != Some(std::path::Path::new("-")) {
        println!("=== Station-Keeping Rollout ===");
        println!("Policy          : {}", rollout.policy);
        println!("Outcome         : {outcome}");
        println!(
            "Steps           : {} / {}",
            rollout.steps.len(),
            env.episode_length()
        );
        println!("Total reward    : {:.3}", rollout.total_reward);
        println!(
            "Burns           : {} (Δv = {:.2} m/s)",
            rollout.thrust_count, rollout.delta_v_spent_m_s
        );
        if let Some(altitude) = rollout.final_altitude_km() {
            println!(
                "Final altitude  : {:.3} km (target {:.1} km)",
                altitude, config.target_altitude_km
            );
        }
        println!(
            "Time in band    : {:.1}%",
            rollout.in_band_fraction(config.allowed_band_km) * 100.0
        );
    }

    if let Some(path) = &cli.trace {
        let writer = trace::writer_for_path(path)?;
        trace::write_rollout(writer, &rollout)?;
    }
    if let Some(path) = &cli.summary {
        summary::write_summary(path, &summary::RolloutSummary::new(&rollout, config))?;
    }

    Ok(())
}
