use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Archive extraction events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtractEvent {
    /// Extraction started
    Started { archive: String, dest: String },

    /// Extraction finished and the destination directory exists
    Completed {
        archive: String,
        dest: String,
        duration: Duration,
    },

    /// Destination already present, extraction skipped
    Skipped { dest: String },
}
