//! Timeout wrappers for build command execution

use rigup_errors::{BuildError, Error};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Execute a future with a timeout.
pub async fn with_timeout<F, T>(
    future: F,
    timeout_duration: Duration,
    command: &str,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match timeout(timeout_duration, future).await {
        Ok(result) => result,
        Err(_) => Err(BuildError::Timeout {
            command: command.to_string(),
            seconds: timeout_duration.as_secs(),
        }
        .into()),
    }
}

/// Execute a future with an optional timeout.
///
/// With `None` the future runs unbounded; compiles and test-suite runs
/// legitimately take as long as they take unless configured otherwise.
pub async fn with_optional_timeout<F, T>(
    future: F,
    timeout_seconds: Option<u64>,
    command: &str,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match timeout_seconds {
        Some(seconds) => with_timeout(future, Duration::from_secs(seconds), command).await,
        None => future.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_timeout_passes_through_fast_futures() {
        let result = with_timeout(async { Ok::<_, Error>(42) }, Duration::from_secs(5), "fast")
            .await
            .unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn with_timeout_reports_slow_futures() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, Error>(())
        };
        let err = with_timeout(slow, Duration::from_millis(10), "make install")
            .await
            .unwrap_err();
        match err {
            Error::Build(BuildError::Timeout { command, .. }) => {
                assert_eq!(command, "make install");
            }
            other => panic!("expected timeout error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn with_optional_timeout_none_runs_unbounded() {
        let result = with_optional_timeout(async { Ok::<_, Error>("done") }, None, "unbounded")
            .await
            .unwrap();
        assert_eq!(result, "done");
    }
}
