//! Serializable outcome reports for runs and checks

use rigup_errors::Error;
use serde::Serialize;

/// What happened to a single step during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Precondition already held, nothing was done
    Satisfied,
    /// Actions ran and the postcondition now holds
    Provisioned,
    /// A sub-operation or the postcondition failed
    Failed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfied => write!(f, "satisfied"),
            Self::Provisioned => write!(f, "provisioned"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Per-step record in a [`RunResult`].
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    /// Effectful sub-operations that actually ran, in order
    pub actions: Vec<String>,
}

/// The step that aborted the run and the error that caused it.
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: String,
    pub error: Error,
}

/// Complete record of a run, ending either after the last step or at
/// the first failure.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub plan: Option<String>,
    pub outcomes: Vec<StepOutcome>,
    pub failure: Option<StepFailure>,
    pub duration_ms: u64,
}

impl RunResult {
    /// `true` when every selected step ended satisfied or provisioned.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    /// Steps whose preconditions already held.
    #[must_use]
    pub fn satisfied(&self) -> usize {
        self.count(StepStatus::Satisfied)
    }

    /// Steps that ran their actions to completion.
    #[must_use]
    pub fn provisioned(&self) -> usize {
        self.count(StepStatus::Provisioned)
    }

    fn count(&self, status: StepStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }
}

/// Probe result for one step in a read-only check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub step: String,
    pub probe: String,
    pub satisfied: bool,
    /// Extra detail, e.g. missing package names or a probe error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Result of probing every selected step without running actions.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub plan: Option<String>,
    pub steps: Vec<CheckOutcome>,
}

impl CheckReport {
    /// Steps whose precondition does not currently hold.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.steps.iter().filter(|step| !step.satisfied).count()
    }

    /// `true` when every step's precondition already holds.
    #[must_use]
    pub fn all_satisfied(&self) -> bool {
        self.pending() == 0
    }
}
