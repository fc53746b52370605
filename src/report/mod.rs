//! Run status report consumed by the screenshot dashboard

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::models::BookingOutcome;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusEntry {
    pub user: String,
    pub status: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&BookingOutcome> for StatusEntry {
    fn from(outcome: &BookingOutcome) -> Self {
        Self {
            user: outcome.user.clone(),
            status: if outcome.success { "Success" } else { "Failed" },
            timestamp: outcome.finished_at.to_rfc3339(),
            court: outcome.court.clone(),
            slot: outcome.slot.clone(),
            error: outcome.error.clone(),
        }
    }
}

/// Writes `outcomes` as a JSON array of status entries
pub fn write_status(path: &Path, outcomes: &[BookingOutcome]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let entries: Vec<StatusEntry> = outcomes.iter().map(StatusEntry::from).collect();
    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Status report written to {}", path.display());
    Ok(())
}

/// One line per user, as printed at the end of a run
pub fn summary(outcomes: &[BookingOutcome]) -> String {
    outcomes
        .iter()
        .map(|o| format!("{}: {}", o.user, if o.success { "Success" } else { "Failed" }))
        .collect::<Vec<_>>()
        .join("\n")
}
