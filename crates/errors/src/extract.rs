//! Archive extraction error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ExtractError {
    #[error("unsupported archive format: {path}")]
    UnsupportedFormat { path: String },

    #[error("failed to extract {path}: {message}")]
    ArchiveFailed { path: String, message: String },

    #[error("expected directory {dest} missing after extracting {path}")]
    DestinationMissing { path: String, dest: String },
}

impl UserFacingError for ExtractError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedFormat { .. } => {
                Some("Only .tar.gz, .tgz and .tar archives are supported.")
            }
            Self::ArchiveFailed { .. } => {
                Some("The archive may be corrupt. Delete it and run again to re-download.")
            }
            Self::DestinationMissing { .. } => {
                Some("Check that the unpack destination matches the archive's top-level directory.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnsupportedFormat { .. } => "extract.unsupported_format",
            Self::ArchiveFailed { .. } => "extract.archive_failed",
            Self::DestinationMissing { .. } => "extract.destination_missing",
        };
        Some(code)
    }
}
