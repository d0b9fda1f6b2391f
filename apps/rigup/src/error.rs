//! CLI error handling

use std::fmt;

use rigup_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Config, plan, or provisioning error
    Op(rigup_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Process exit code for this error's failure class
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Op(e) => e.exit_code(),
            CliError::Io(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Op(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Op(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<rigup_errors::Error> for CliError {
    fn from(e: rigup_errors::Error) -> Self {
        CliError::Op(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
