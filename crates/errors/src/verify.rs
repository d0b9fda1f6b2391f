//! Postcondition verification error types
//!
//! Raised when a step's action completed but the postcondition probe still
//! reports the capability absent. This is the "claimed done, is not done"
//! case and always aborts the run.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VerificationError {
    #[error("step '{step}' completed but postcondition not satisfied: {probe}")]
    Unsatisfied { step: String, probe: String },

    #[error("step '{step}' postcondition probe failed: {message}")]
    ProbeFailed { step: String, message: String },
}

impl UserFacingError for VerificationError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Unsatisfied { .. } => {
                Some("The step's actions ran but left the system short of its goal; inspect the step output.")
            }
            Self::ProbeFailed { .. } => {
                Some("Fix the postcondition probe so it can be evaluated.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Unsatisfied { .. } => "verify.unsatisfied",
            Self::ProbeFailed { .. } => "verify.probe_failed",
        };
        Some(code)
    }
}
