use serde::{Deserialize, Serialize};

/// Artifact download events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Download started
    Started { url: String, total_size: Option<u64> },

    /// Download progress update
    Progress {
        url: String,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    /// Download completed successfully
    Completed {
        url: String,
        final_size: u64,
        hash: String,
    },

    /// Artifact already present on disk, no download needed
    AlreadyPresent { url: String, path: String },
}
