//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Simulation parameters
    #[serde(default)]
    pub simulation: RawSimulation,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            config_version: crate::CURRENT_CONFIG_VERSION,
            simulation: RawSimulation::default(),
            service: RawServiceConfig::default(),
        }
    }
}

/// Simulation parameters. Anything left out falls back to the defaults.
///
/// Numbers are kept wide here so out-of-range values reach validation
/// instead of failing inside the TOML parser.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSimulation {
    /// First simulated hour
    pub hour_start: Option<i64>,

    /// Last simulated hour
    pub hour_end: Option<i64>,

    /// Wall-clock seconds per simulated hour
    pub tick_seconds: Option<f64>,

    /// Maximum headcount per hour
    pub capacity: Option<i64>,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Request pipe path (default: $XDG_RUNTIME_DIR/parkgated/requests.pipe)
    pub pipe_path: Option<PathBuf>,

    /// How long the dispatcher gets to stop on its own at shutdown
    pub grace_period_ms: Option<u64>,

    /// How long to wait for a requester to open its reply pipe
    pub reply_timeout_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
            config_version = 1

            [simulation]
            hour_start = 7
            hour_end = 19
            tick_seconds = 0.5
            capacity = 50

            [service]
            pipe_path = "/tmp/park/requests.pipe"
            grace_period_ms = 250
            reply_timeout_ms = 100
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.simulation.hour_end, Some(19));
        assert_eq!(config.simulation.tick_seconds, Some(0.5));
        assert_eq!(
            config.service.pipe_path,
            Some(PathBuf::from("/tmp/park/requests.pipe"))
        );
        assert_eq!(config.service.grace_period_ms, Some(250));
    }

    #[test]
    fn negative_capacity_still_parses() {
        let toml_str = r#"
            config_version = 1
            [simulation]
            capacity = -5
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.simulation.capacity, Some(-5));
    }
}
