//! Configuration parsing and validation for parkgated
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Simulation parameters (hour range, tick rate, capacity)
//! - Service settings (request pipe, shutdown grace period, reply timeout)
//! - Command-line overrides merged on top of the file
//! - Validation with clear error messages

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load a configuration file without validating it.
///
/// Validation happens in [`resolve`], once command-line overrides are known.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<RawConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<RawConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    Ok(raw)
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1

            [simulation]
            capacity = 30
        "#;

        let raw = parse_config(config).unwrap();
        assert_eq!(raw.simulation.capacity, Some(30));
        assert_eq!(raw.simulation.hour_start, None);
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "config_version = 1\n[simulation]\nhour_start = 8\nhour_end = 12\n"
        )
        .unwrap();

        let raw = load_config(file.path()).unwrap();
        let settings = resolve(raw, &Overrides::default()).unwrap();
        assert_eq!(settings.simulation.hour_start, 8);
        assert_eq!(settings.simulation.hour_end, 12);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
