//! Process execution for build commands and command probes

use rigup_errors::{BuildError, Error};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Captured result of a completed command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run a command to completion, capturing stdout and stderr.
///
/// The command is not run through a shell; `argv[0]` is the program and
/// the rest are its arguments. A non-zero exit is reported in the
/// returned [`CommandResult`], not as an error.
pub async fn run_command(
    argv: &[String],
    env: &HashMap<String, String>,
    workdir: Option<&Path>,
) -> Result<CommandResult, Error> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::internal("cannot run an empty command"))?;
    let rendered = argv.join(" ");

    if let Some(dir) = workdir {
        if !dir.is_dir() {
            return Err(BuildError::WorkdirMissing {
                path: dir.display().to_string(),
            }
            .into());
        }
    }

    let mut command = Command::new(program);
    command
        .args(args)
        .envs(env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = workdir {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .map_err(|e| BuildError::SpawnFailed {
            command: rendered,
            message: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout)
        .lines()
        .collect::<Vec<_>>()
        .join("\n");
    let stderr = String::from_utf8_lossy(&output.stderr)
        .lines()
        .collect::<Vec<_>>()
        .join("\n");

    Ok(CommandResult {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout,
        stderr,
    })
}

/// Run a probe command and report whether it exited successfully.
///
/// A missing program counts as an unsatisfied probe, not an error;
/// that is the usual way a probe witnesses an absent tool.
pub async fn probe_command(argv: &[String]) -> Result<bool, Error> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::internal("cannot probe with an empty command"))?;

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) => Ok(status.success()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::internal(format!(
            "failed to spawn probe '{}': {e}",
            argv.join(" ")
        ))),
    }
}
