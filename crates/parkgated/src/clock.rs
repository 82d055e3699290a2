//! Simulation clock task

use parkgate_core::CoreEvent;
use std::time::Duration;
use tracing::{debug, info};

use crate::controller::SharedState;

/// Advance the simulated hour every `tick`, until the day is over.
///
/// Returns once the clock has finished.
pub async fn run_clock(state: SharedState, tick: Duration) {
    loop {
        tokio::time::sleep(tick).await;

        let event = {
            let mut state = state.lock().await;
            state.advance_clock()
        };

        match event {
            Some(CoreEvent::HourAdvanced { hour, headcount }) => {
                info!(hour, headcount, "Hour advanced");
            }
            Some(CoreEvent::SimulationFinished { final_hour }) => {
                info!(final_hour, "Simulation finished");
                return;
            }
            None => {
                debug!("Clock already finished");
                return;
            }
        }
    }
}
