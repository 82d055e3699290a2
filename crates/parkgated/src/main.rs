//! parkgated - Admission control for timed group visits
//!
//! This is the main entry point for the parkgated service.
//! It wires together all the components:
//! - Configuration loading and validation
//! - Shared park state (occupancy, clock, statistics)
//! - The request pipe and reply delivery
//! - The clock and dispatcher tasks
//! - The end-of-run report

mod clock;
mod controller;
mod dispatcher;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use parkgate_config::{Overrides, RawConfig, load_config, resolve};
use parkgate_ipc::FifoReplySender;
use std::future::Future;
use std::path::PathBuf;
use tokio::signal::unix::{SignalKind, signal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::controller::Controller;

/// parkgated - Admission control for timed group visits
#[derive(Parser, Debug)]
#[command(name = "parkgated")]
#[command(about = "Admission control for timed group visits", long_about = None)]
struct Args {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First simulated hour
    #[arg(short = 'i', long)]
    hour_start: Option<i64>,

    /// Last simulated hour
    #[arg(short = 'f', long)]
    hour_end: Option<i64>,

    /// Wall-clock seconds per simulated hour
    #[arg(short = 's', long)]
    tick_seconds: Option<f64>,

    /// Maximum headcount per hour
    #[arg(short = 't', long)]
    capacity: Option<i64>,

    /// Request pipe path override (or set PARKGATE_PIPE env var)
    #[arg(short, long, env = "PARKGATE_PIPE")]
    pipe: Option<PathBuf>,

    /// Also write the final report as JSON to this path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            hour_start: self.hour_start,
            hour_end: self.hour_end,
            tick_seconds: self.tick_seconds,
            capacity: self.capacity,
            pipe_path: self.pipe.clone(),
        }
    }
}

/// Resolves on the first SIGTERM or SIGINT
fn termination_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("Received SIGINT, shutting down"),
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "parkgated starting");

    // Configuration errors are fatal before any pipe is touched
    let raw = match &args.config {
        Some(path) => {
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => RawConfig::default(),
    };
    let settings = resolve(raw, &args.overrides()).context("Invalid configuration")?;

    info!(
        hour_start = settings.simulation.hour_start,
        hour_end = settings.simulation.hour_end,
        capacity = settings.simulation.capacity,
        "Configuration loaded"
    );

    let stop = termination_signal()?;
    let replies = FifoReplySender::new(settings.service.reply_timeout);

    let controller = Controller::new(settings).await?;
    let run = controller.run(replies, stop).await?;

    run.log();
    if let Some(path) = &args.report {
        run.write_json(path)?;
    }

    info!("parkgated stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let args = Args::try_parse_from([
            "parkgated",
            "--hour-start",
            "9",
            "-f",
            "17",
            "--tick-seconds",
            "0.5",
            "-t",
            "30",
            "--pipe",
            "/tmp/park.pipe",
        ])
        .unwrap();

        let overrides = args.overrides();
        assert_eq!(overrides.hour_start, Some(9));
        assert_eq!(overrides.hour_end, Some(17));
        assert_eq!(overrides.tick_seconds, Some(0.5));
        assert_eq!(overrides.capacity, Some(30));
        assert_eq!(overrides.pipe_path, Some(PathBuf::from("/tmp/park.pipe")));
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn invalid_flags_fail_validation() {
        let args = Args::try_parse_from(["parkgated", "--hour-start", "12", "--hour-end", "10"])
            .unwrap();
        assert!(resolve(RawConfig::default(), &args.overrides()).is_err());
    }
}
