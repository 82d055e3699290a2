//! Shared utilities for parkgated
//!
//! This crate provides:
//! - Identifier types (AgentName, FamilyName, ChannelId)
//! - Error types
//! - Default paths for the inbound request pipe and reply pipes

mod error;
mod ids;
mod paths;

pub use error::*;
pub use ids::*;
pub use paths::*;

/// A simulated hour of the day, as carried on the wire.
pub type Hour = i32;

/// Lowest hour a simulation may start at.
pub const DOMAIN_HOUR_MIN: Hour = 7;

/// Highest hour a simulation may end at.
pub const DOMAIN_HOUR_MAX: Hour = 19;
