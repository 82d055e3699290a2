//! Simulation clock state machine

use parkgate_util::Hour;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Running,
    /// Terminal: the current hour is past `hour_end`
    Finished,
}

/// Simulated time of day.
///
/// Only moves forward, one hour per [`advance`](Self::advance). Once
/// past `hour_end` it is finished for good.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    current_hour: Hour,
    hour_end: Hour,
    state: ClockState,
}

impl SimulationClock {
    pub fn new(hour_start: Hour, hour_end: Hour) -> Self {
        Self {
            current_hour: hour_start,
            hour_end,
            state: ClockState::Running,
        }
    }

    pub fn current_hour(&self) -> Hour {
        self.current_hour
    }

    pub fn is_finished(&self) -> bool {
        self.state == ClockState::Finished
    }

    /// Move one hour forward.
    ///
    /// Returns the new state, or `None` if the clock had already finished
    /// (the hour does not move then).
    pub fn advance(&mut self) -> Option<ClockState> {
        if self.is_finished() {
            return None;
        }

        self.current_hour += 1;
        if self.current_hour > self.hour_end {
            self.state = ClockState::Finished;
        }
        Some(self.state)
    }
}
