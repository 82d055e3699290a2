//! Admission engine and shared park state for parkgated
//!
//! This crate is the heart of parkgated, containing:
//! - The per-hour occupancy table and its capacity check
//! - Earliest-fit search for a free two-hour block
//! - The admission policy (accept, reschedule, late reschedule, deny)
//! - The simulation clock state machine (Running -> Finished)
//! - Statistics, the agent registry, and the end-of-run report
//!
//! Nothing here is thread-safe on its own. The service keeps a single
//! [`ParkState`] behind one lock and does every read and write through it.

mod admission;
mod clock;
mod events;
mod occupancy;
mod report;
mod search;
mod state;
mod stats;

pub use admission::*;
pub use clock::*;
pub use events::*;
pub use occupancy::*;
pub use report::*;
pub use search::*;
pub use state::*;
pub use stats::*;
