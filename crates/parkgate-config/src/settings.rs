//! Validated settings used by the service

use crate::schema::{RawConfig, RawServiceConfig, RawSimulation};
use crate::validation::validate_config;
use crate::{ConfigError, ConfigResult};
use parkgate_util::{Hour, default_pipe_path};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HOUR_START: i64 = 7;
pub const DEFAULT_HOUR_END: i64 = 19;
pub const DEFAULT_TICK_SECONDS: f64 = 1.0;
pub const DEFAULT_CAPACITY: i64 = 50;
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 1000;
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 500;

impl RawSimulation {
    pub fn effective_hour_start(&self) -> i64 {
        self.hour_start.unwrap_or(DEFAULT_HOUR_START)
    }

    pub fn effective_hour_end(&self) -> i64 {
        self.hour_end.unwrap_or(DEFAULT_HOUR_END)
    }

    pub fn effective_tick_seconds(&self) -> f64 {
        self.tick_seconds.unwrap_or(DEFAULT_TICK_SECONDS)
    }

    pub fn effective_capacity(&self) -> i64 {
        self.capacity.unwrap_or(DEFAULT_CAPACITY)
    }
}

impl RawServiceConfig {
    pub fn effective_pipe_path(&self) -> PathBuf {
        self.pipe_path.clone().unwrap_or_else(default_pipe_path)
    }
}

/// Values given on the command line; each one wins over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hour_start: Option<i64>,
    pub hour_end: Option<i64>,
    pub tick_seconds: Option<f64>,
    pub capacity: Option<i64>,
    pub pipe_path: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, mut raw: RawConfig) -> RawConfig {
        let sim = &mut raw.simulation;
        sim.hour_start = self.hour_start.or(sim.hour_start);
        sim.hour_end = self.hour_end.or(sim.hour_end);
        sim.tick_seconds = self.tick_seconds.or(sim.tick_seconds);
        sim.capacity = self.capacity.or(sim.capacity);
        raw.service.pipe_path = self.pipe_path.clone().or(raw.service.pipe_path);
        raw
    }
}

/// Complete, validated configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub service: ServiceSettings,
}

/// Parameters of one simulated day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSettings {
    pub hour_start: Hour,
    pub hour_end: Hour,
    /// Wall-clock time per simulated hour
    pub tick_interval: Duration,
    pub capacity: u32,
}

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub pipe_path: PathBuf,
    pub grace_period: Duration,
    pub reply_timeout: Duration,
}

/// Merge overrides into a raw config, validate, and produce settings
pub fn resolve(raw: RawConfig, overrides: &Overrides) -> ConfigResult<Settings> {
    let merged = overrides.apply(raw);

    let errors = validate_config(&merged);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    let settings = Settings::from_validated(merged);
    debug!(?settings, "Configuration resolved");
    Ok(settings)
}

impl Settings {
    /// Convert from raw config (after validation)
    fn from_validated(raw: RawConfig) -> Self {
        let sim = &raw.simulation;
        // Validation guarantees every cast below is in range
        let simulation = SimulationSettings {
            hour_start: sim.effective_hour_start() as Hour,
            hour_end: sim.effective_hour_end() as Hour,
            tick_interval: Duration::from_secs_f64(sim.effective_tick_seconds()),
            capacity: sim.effective_capacity() as u32,
        };

        let service = ServiceSettings {
            pipe_path: raw.service.effective_pipe_path(),
            grace_period: Duration::from_millis(
                raw.service.grace_period_ms.unwrap_or(DEFAULT_GRACE_PERIOD_MS),
            ),
            reply_timeout: Duration::from_millis(
                raw.service
                    .reply_timeout_ms
                    .unwrap_or(DEFAULT_REPLY_TIMEOUT_MS),
            ),
        };

        Self {
            simulation,
            service,
        }
    }
}
