//! Shared park state

use parkgate_api::ReservationRequest;
use parkgate_util::{AgentName, ChannelId, Hour};
use tracing::{debug, info};

use crate::{
    AgentRegistry, ClockState, CoreEvent, Decision, OccupancyTable, Report, SimulationClock,
    SimulationParams, Statistics, apply, classify,
};

/// Everything the clock and the dispatcher share.
///
/// Each method is one critical section: callers hold the service lock for
/// the duration of a call and never between calls.
#[derive(Debug, Clone)]
pub struct ParkState {
    params: SimulationParams,
    occupancy: OccupancyTable,
    clock: SimulationClock,
    statistics: Statistics,
    registry: AgentRegistry,
}

impl ParkState {
    pub fn new(params: SimulationParams) -> Self {
        info!(
            hour_start = params.hour_start,
            hour_end = params.hour_end,
            capacity = params.capacity,
            "Park state initialized"
        );

        Self {
            params,
            occupancy: OccupancyTable::new(params),
            clock: SimulationClock::new(params.hour_start, params.hour_end),
            statistics: Statistics::default(),
            registry: AgentRegistry::default(),
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn current_hour(&self) -> Hour {
        self.clock.current_hour()
    }

    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    pub fn occupancy(&self) -> &OccupancyTable {
        &self.occupancy
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Handle a handshake: remember the channel and return the current hour.
    ///
    /// Returns `None` once the day is over, without recording anything.
    pub fn register_agent(&mut self, agent: &AgentName, channel: &ChannelId) -> Option<Hour> {
        if self.clock.is_finished() {
            debug!(agent = %agent, channel = %channel, "Day is over, handshake ignored");
            return None;
        }

        if self.registry.register(channel, agent) {
            info!(agent = %agent, channel = %channel, "Agent registered");
        } else {
            debug!(agent = %agent, channel = %channel, "Agent already registered");
        }
        Some(self.clock.current_hour())
    }

    /// Classify a request, apply the decision and count it, as one step.
    ///
    /// Returns `None` once the day is over; occupancy and counters are left
    /// as they were.
    pub fn admit(&mut self, request: &ReservationRequest) -> Option<Decision> {
        if self.clock.is_finished() {
            debug!(
                agent = %request.agent,
                family = %request.family,
                "Day is over, request ignored"
            );
            return None;
        }

        let current_hour = self.clock.current_hour();
        let decision = classify(&self.occupancy, request, current_hour);
        apply(&mut self.occupancy, &decision, request.party_size);
        self.statistics.record(&decision);

        debug!(
            agent = %request.agent,
            family = %request.family,
            requested_hour = request.requested_hour,
            party_size = request.party_size,
            current_hour,
            decision = ?decision,
            "Request admitted"
        );

        Some(decision)
    }

    /// Advance the simulated clock by one hour
    pub fn advance_clock(&mut self) -> Option<CoreEvent> {
        match self.clock.advance()? {
            ClockState::Running => {
                let hour = self.clock.current_hour();
                Some(CoreEvent::HourAdvanced {
                    hour,
                    headcount: self.occupancy.get(hour),
                })
            }
            ClockState::Finished => Some(CoreEvent::SimulationFinished {
                final_hour: self.clock.current_hour(),
            }),
        }
    }

    pub fn report(&self) -> Report {
        Report::build(&self.occupancy, self.statistics, &self.registry)
    }
}
