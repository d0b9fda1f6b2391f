//! Artifact integrity error types
//!
//! Integrity failures never remove the offending file. The artifact stays on
//! disk exactly as downloaded so the operator can inspect it; the hint tells
//! them to delete it before the next run.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum IntegrityError {
    #[error("artifact {path} is {actual} bytes, below the required minimum of {expected_min}")]
    SizeBelowMinimum {
        path: String,
        actual: u64,
        expected_min: u64,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

impl IntegrityError {
    /// Path of the artifact that failed verification.
    #[must_use]
    pub fn artifact_path(&self) -> &str {
        match self {
            Self::SizeBelowMinimum { path, .. } | Self::ChecksumMismatch { path, .. } => path,
        }
    }
}

impl UserFacingError for IntegrityError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("The artifact was left in place. Delete it and run again to fetch a fresh copy.")
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::SizeBelowMinimum { .. } => "integrity.size_below_minimum",
            Self::ChecksumMismatch { .. } => "integrity.checksum_mismatch",
        };
        Some(code)
    }
}
