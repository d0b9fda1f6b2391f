use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Step runner lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    /// A run over the plan started
    Started { plan: String, total_steps: usize },

    /// A step began evaluation
    StepStarted {
        step: String,
        index: usize,
        total: usize,
    },

    /// Step precondition already satisfied, nothing to do
    StepSkipped { step: String, probe: String },

    /// Step precondition probe could not be evaluated; treated as unsatisfied
    ProbeInconclusive { step: String, reason: String },

    /// Step actions completed and postcondition holds
    StepProvisioned { step: String, duration: Duration },

    /// Step failed; the run aborts after this event
    StepFailed {
        step: String,
        failure: FailureContext,
    },

    /// The whole run finished without aborting
    Completed {
        provisioned: usize,
        satisfied: usize,
        duration: Duration,
    },
}
