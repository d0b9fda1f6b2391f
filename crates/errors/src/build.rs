//! Build command error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("command `{command}` exited with {}", exit_code.map_or_else(|| "no status".to_string(), |c| format!("status {c}")))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to spawn `{command}`: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("working directory missing: {path}")]
    WorkdirMissing { path: String },

    #[error("command `{command}` timed out after {seconds} seconds")]
    Timeout { command: String, seconds: u64 },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Self::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                let status = exit_code.map_or_else(|| "no status".to_string(), |c| c.to_string());
                let tail = stderr.lines().last().unwrap_or_default();
                if tail.is_empty() {
                    Cow::Owned(format!("command `{command}` failed (status {status})"))
                } else {
                    Cow::Owned(format!(
                        "command `{command}` failed (status {status}): {tail}"
                    ))
                }
            }
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => {
                Some("Inspect the captured output above, fix the cause, then re-run.")
            }
            Self::SpawnFailed { .. } => {
                Some("Ensure the command exists on PATH and is executable.")
            }
            Self::WorkdirMissing { .. } => {
                Some("A previous unpack may have used a different destination; check the plan.")
            }
            Self::Timeout { .. } => Some("Raise command_timeout in the configuration and retry."),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CommandFailed { .. } => "build.command_failed",
            Self::SpawnFailed { .. } => "build.spawn_failed",
            Self::WorkdirMissing { .. } => "build.workdir_missing",
            Self::Timeout { .. } => "build.timeout",
        };
        Some(code)
    }
}
