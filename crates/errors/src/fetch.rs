//! Artifact fetch error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("connection failed: {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("transfer interrupted for {url}: {message}")]
    Interrupted { url: String, message: String },

    #[error("rate limited: retry after {seconds} seconds")]
    RateLimited { seconds: u64 },
}

impl UserFacingError for FetchError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidUrl(_) => Some("Correct the artifact URL in the plan file."),
            Self::Timeout { .. } | Self::ConnectionFailed { .. } | Self::Interrupted { .. } => {
                Some("Check network connectivity and retry the run.")
            }
            Self::HttpStatus { status, .. } if *status == 404 => {
                Some("The artifact is gone from the server; update the URL in the plan.")
            }
            Self::RateLimited { .. } => Some("Wait for the indicated delay before retrying."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::ConnectionFailed { .. }
            | Self::Interrupted { .. }
            | Self::RateLimited { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::InvalidUrl(_) => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidUrl(_) => "fetch.invalid_url",
            Self::Timeout { .. } => "fetch.timeout",
            Self::ConnectionFailed { .. } => "fetch.connection_failed",
            Self::HttpStatus { .. } => "fetch.http_status",
            Self::Interrupted { .. } => "fetch.interrupted",
            Self::RateLimited { .. } => "fetch.rate_limited",
        };
        Some(code)
    }
}
