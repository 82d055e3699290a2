//! Decision counters and the agent registry

use parkgate_util::{AgentName, ChannelId};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::Decision;

/// Count of finalized decisions per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub accepted: u64,
    pub late_rescheduled: u64,
    pub rescheduled: u64,
    pub denied: u64,
}

impl Statistics {
    pub fn record(&mut self, decision: &Decision) {
        match decision {
            Decision::Accepted { .. } => self.accepted += 1,
            Decision::LateRescheduled { .. } => self.late_rescheduled += 1,
            Decision::Rescheduled { .. } => self.rescheduled += 1,
            Decision::Denied { .. } => self.denied += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.accepted + self.late_rescheduled + self.rescheduled + self.denied
    }
}

/// Reply channels seen so far, with the agent that first used each.
///
/// Append-only; used for diagnostics, never for admission.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    channels: BTreeMap<ChannelId, AgentName>,
}

impl AgentRegistry {
    /// Record a channel. Returns `true` the first time it is seen.
    pub fn register(&mut self, channel: &ChannelId, agent: &AgentName) -> bool {
        if self.channels.contains_key(channel) {
            return false;
        }
        self.channels.insert(channel.clone(), agent.clone());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChannelId, &AgentName)> {
        self.channels.iter()
    }
}
