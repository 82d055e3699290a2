//! Config validation CLI tool
//!
//! Validates a parkgated configuration file and reports any errors.

use parkgate_config::{ConfigError, Overrides, CURRENT_CONFIG_VERSION};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: validate-config <config-file>");
            eprintln!();
            eprintln!("Validates a parkgated configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config parkgate.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    let result = parkgate_config::load_config(&config_path)
        .and_then(|raw| parkgate_config::resolve(raw, &Overrides::default()));

    match result {
        Ok(settings) => {
            let sim = &settings.simulation;
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            println!("  Hours: {}:00 - {}:00", sim.hour_start, sim.hour_end);
            println!("  Tick: {:?} per simulated hour", sim.tick_interval);
            println!("  Capacity: {} per hour", sim.capacity);
            println!("  Request pipe: {}", settings.service.pipe_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
