//! Configuration validation

use crate::schema::RawConfig;
use parkgate_util::{DOMAIN_HOUR_MAX, DOMAIN_HOUR_MIN};
use thiserror::Error;

/// Longest accepted tick, to keep durations well away from overflow
pub const MAX_TICK_SECONDS: f64 = 3600.0;

/// Validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} = {value} is outside {min}..={max}")]
    HourOutOfDomain {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("hour_start ({start}) must be before hour_end ({end})")]
    HourOrder { start: i64, end: i64 },

    #[error("tick_seconds must be positive and at most {max}, got {value}")]
    InvalidTick { value: f64, max: f64 },

    #[error("capacity must be positive, got {0}")]
    NonPositiveCapacity(i64),

    #[error("capacity {0} is too large")]
    CapacityTooLarge(i64),

    #[error("Service config error: {0}")]
    ServiceError(String),
}

/// Validate a raw configuration, with defaults filled in for missing values
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let sim = &config.simulation;

    let start = sim.effective_hour_start();
    let end = sim.effective_hour_end();
    errors.extend(validate_hour("hour_start", start));
    errors.extend(validate_hour("hour_end", end));
    if start >= end {
        errors.push(ValidationError::HourOrder { start, end });
    }

    let tick = sim.effective_tick_seconds();
    // NaN fails both comparisons
    if !(tick > 0.0 && tick <= MAX_TICK_SECONDS) {
        errors.push(ValidationError::InvalidTick {
            value: tick,
            max: MAX_TICK_SECONDS,
        });
    }

    let capacity = sim.effective_capacity();
    if capacity <= 0 {
        errors.push(ValidationError::NonPositiveCapacity(capacity));
    } else if capacity > i64::from(u32::MAX) {
        errors.push(ValidationError::CapacityTooLarge(capacity));
    }

    if config.service.effective_pipe_path().as_os_str().is_empty() {
        errors.push(ValidationError::ServiceError(
            "pipe_path cannot be empty".into(),
        ));
    }

    errors
}

fn validate_hour(field: &'static str, value: i64) -> Option<ValidationError> {
    let (min, max) = (i64::from(DOMAIN_HOUR_MIN), i64::from(DOMAIN_HOUR_MAX));
    if value < min || value > max {
        return Some(ValidationError::HourOutOfDomain {
            field,
            value,
            min,
            max,
        });
    }
    None
}
