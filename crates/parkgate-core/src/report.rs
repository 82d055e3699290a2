//! End-of-run report

use parkgate_util::{AgentName, Hour};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::{AgentRegistry, OccupancyTable, Statistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: Hour,
    pub headcount: u32,
}

/// Hours tied at one extreme of occupancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourExtreme {
    pub hours: Vec<Hour>,
    pub headcount: u32,
}

/// Summary of a simulated day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub hour_start: Hour,
    pub hour_end: Hour,
    pub capacity: u32,
    pub statistics: Statistics,
    pub peak: HourExtreme,
    pub valley: HourExtreme,
    pub occupancy: Vec<HourCount>,
    /// Distinct reply channels that completed a handshake
    pub agents_seen: usize,
    /// Names of the agents behind those channels, sorted and deduplicated
    pub agents: Vec<AgentName>,
}

impl Report {
    pub fn build(table: &OccupancyTable, statistics: Statistics, registry: &AgentRegistry) -> Self {
        let params = table.params();
        let mut agents_seen = 0;
        let mut agents = BTreeSet::new();
        for (_, agent) in registry.iter() {
            agents_seen += 1;
            agents.insert(agent.clone());
        }

        let (peak_hours, peak_count) = table.peak_hours();
        let (valley_hours, valley_count) = table.valley_hours();

        Self {
            hour_start: params.hour_start,
            hour_end: params.hour_end,
            capacity: params.capacity,
            statistics,
            peak: HourExtreme {
                hours: peak_hours,
                headcount: peak_count,
            },
            valley: HourExtreme {
                hours: valley_hours,
                headcount: valley_count,
            },
            occupancy: table
                .iter()
                .map(|(hour, headcount)| HourCount { hour, headcount })
                .collect(),
            agents_seen,
            agents: agents.into_iter().collect(),
        }
    }
}
