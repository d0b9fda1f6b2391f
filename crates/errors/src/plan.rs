//! Plan file error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PlanError {
    #[error("plan file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read plan {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("plan contains no steps")]
    Empty,

    #[error("duplicate step name: {name}")]
    DuplicateStep { name: String },

    #[error("step '{step}' has neither precondition nor postcondition")]
    MissingCondition { step: String },

    #[error("step '{step}' is invalid: {message}")]
    InvalidStep { step: String, message: String },

    #[error("no step named '{name}' in the plan")]
    UnknownStep { name: String },
}

impl UserFacingError for PlanError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Point --plan at a plan file or create plan.toml in the working directory.")
            }
            Self::ParseError { .. } => Some("Fix the TOML syntax error and retry."),
            Self::Empty => Some("Add at least one [[step]] entry to the plan."),
            Self::DuplicateStep { .. } => Some("Give every step a unique name."),
            Self::MissingCondition { .. } => {
                Some("Declare a precondition or postcondition so the step can be skipped once done.")
            }
            Self::UnknownStep { .. } => {
                Some("Use `rigup list` to see the step names defined by the plan.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "plan.not_found",
            Self::ReadError { .. } => "plan.read_error",
            Self::ParseError { .. } => "plan.parse_error",
            Self::Empty => "plan.empty",
            Self::DuplicateStep { .. } => "plan.duplicate_step",
            Self::MissingCondition { .. } => "plan.missing_condition",
            Self::InvalidStep { .. } => "plan.invalid_step",
            Self::UnknownStep { .. } => "plan.unknown_step",
        };
        Some(code)
    }
}
