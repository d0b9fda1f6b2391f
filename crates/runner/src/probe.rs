//! Probe evaluation
//!
//! A probe is a cheap boolean witness for a capability. Probes must not
//! change system state; the runner relies on that to keep re-runs
//! idempotent.

use crate::exec;
use rigup_errors::Error;
use rigup_plan::Probe;
use std::path::Path;

/// Evaluate a probe, returning whether the capability it witnesses is
/// currently present.
///
/// Absence is an ordinary `Ok(false)`. An `Err` means the probe itself
/// could not be evaluated, e.g. a permission failure on a path check;
/// callers decide how conclusive to treat that.
pub async fn evaluate(probe: &Probe) -> Result<bool, Error> {
    match probe {
        Probe::Command { command } => exec::probe_command(command).await,
        Probe::File { file } => metadata_check(file, std::fs::Metadata::is_file).await,
        Probe::Dir { dir } => metadata_check(dir, std::fs::Metadata::is_dir).await,
        Probe::Path { path } => metadata_check(path, |_| true).await,
    }
}

async fn metadata_check<F>(path: &Path, check: F) -> Result<bool, Error>
where
    F: FnOnce(&std::fs::Metadata) -> bool,
{
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(check(&meta)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn file_probe_distinguishes_files_from_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("present.txt");
        std::fs::write(&file_path, b"x").unwrap();

        let file_probe = Probe::File {
            file: file_path.clone(),
        };
        assert!(evaluate(&file_probe).await.unwrap());

        let dir_as_file = Probe::File {
            file: dir.path().to_path_buf(),
        };
        assert!(!evaluate(&dir_as_file).await.unwrap());
    }

    #[tokio::test]
    async fn dir_probe_matches_directories() {
        let dir = tempfile::tempdir().unwrap();
        let probe = Probe::Dir {
            dir: dir.path().to_path_buf(),
        };
        assert!(evaluate(&probe).await.unwrap());
    }

    #[tokio::test]
    async fn path_probe_accepts_any_kind() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("thing");
        std::fs::write(&file_path, b"x").unwrap();

        assert!(evaluate(&Probe::Path { path: file_path }).await.unwrap());
        assert!(
            evaluate(&Probe::Path {
                path: dir.path().to_path_buf(),
            })
            .await
            .unwrap()
        );
    }

    #[tokio::test]
    async fn missing_path_is_unsatisfied_not_an_error() {
        let probe = Probe::Path {
            path: PathBuf::from("/nonexistent/rigup/probe/target"),
        };
        assert!(!evaluate(&probe).await.unwrap());
    }

    #[tokio::test]
    async fn command_probe_reflects_exit_status() {
        let yes = Probe::Command {
            command: vec!["true".to_string()],
        };
        assert!(evaluate(&yes).await.unwrap());

        let no = Probe::Command {
            command: vec!["false".to_string()],
        };
        assert!(!evaluate(&no).await.unwrap());
    }
}
