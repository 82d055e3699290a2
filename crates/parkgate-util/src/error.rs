//! Error types for parkgated

use thiserror::Error;

/// Core error type for parkgate operations
#[derive(Debug, Error)]
pub enum ParkgateError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ParkgateError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ParkgateError>;
