use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Package set events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PackageEvent {
    /// Probing which entries are already installed
    Probing { manager: String, total: usize },

    /// Entries the probe reported missing
    Missing { names: Vec<String> },

    /// Package manager invocation started
    InstallStarted {
        manager: String,
        packages: Vec<String>,
    },

    /// Package manager invocation finished
    InstallCompleted {
        manager: String,
        installed: usize,
        duration: Duration,
    },
}
