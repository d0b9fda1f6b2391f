use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Build command events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// A build command was spawned
    CommandStarted { command: String, workdir: String },

    /// A build command exited successfully
    CommandCompleted { command: String, duration: Duration },
}
