//! Run report output

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use parkgate_core::Report;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// A day's report plus when the run happened and how it ended
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// False when the run was stopped by a signal before the day ended
    pub completed: bool,
    #[serde(flatten)]
    pub report: Report,
}

impl RunReport {
    pub fn log(&self) {
        let stats = &self.report.statistics;
        info!(
            accepted = stats.accepted,
            late_rescheduled = stats.late_rescheduled,
            rescheduled = stats.rescheduled,
            denied = stats.denied,
            total = stats.total(),
            agents = self.report.agents_seen,
            agent_names = ?self.report.agents,
            completed = self.completed,
            "Final statistics"
        );
        info!(
            hours = ?self.report.peak.hours,
            headcount = self.report.peak.headcount,
            "Peak hours"
        );
        info!(
            hours = ?self.report.valley.hours,
            headcount = self.report.valley.headcount,
            "Valley hours"
        );
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {:?}", path))?;

        info!(path = %path.display(), "Report written");
        Ok(())
    }
}
