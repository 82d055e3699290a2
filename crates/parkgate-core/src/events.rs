//! Events emitted by the park state

use parkgate_util::Hour;

/// Events emitted when the simulation clock moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// The clock moved to a new hour inside the simulated day
    HourAdvanced {
        hour: Hour,
        /// People in the park during the new hour
        headcount: u32,
    },

    /// The clock passed the last hour; emitted exactly once
    SimulationFinished { final_hour: Hour },
}
