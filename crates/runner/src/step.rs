//! Per-step execution
//!
//! A source step runs its sub-operations in a fixed order: fetch, verify,
//! unpack, build. The first failure aborts the step; later sub-operations
//! are never attempted. Packages steps delegate to [`crate::package`].

use crate::{archive, exec, package, probe, timeout, verify, RunContext};
use rigup_errors::{BuildError, Error, ExtractError, VerificationError};
use rigup_events::{AppEvent, BuildEvent, DownloadEvent, EventEmitter, ExtractEvent, RunEvent};
use rigup_plan::Step;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How a single step ended, short of failure.
pub(crate) struct StepRun {
    /// Precondition already held, no actions ran
    pub satisfied: bool,
    /// Description of the probe that decided the step
    pub probe: String,
    /// Effectful sub-operations that ran, in order
    pub actions: Vec<String>,
}

pub(crate) async fn run_step(ctx: &RunContext, step: &Step) -> Result<StepRun, Error> {
    if let Some(set) = &step.packages {
        return package::run_packages_step(ctx, &step.name, set).await;
    }

    let pre = step
        .effective_precondition()
        .ok_or_else(|| Error::internal(format!("step '{}' has no condition", step.name)))?;

    let satisfied = match probe::evaluate(pre).await {
        Ok(value) => value,
        Err(e) => {
            // an unanswerable precondition is not proof of absence, but
            // running the actions is the safe direction for idempotent steps
            ctx.emit(AppEvent::Run(RunEvent::ProbeInconclusive {
                step: step.name.clone(),
                reason: e.to_string(),
            }));
            false
        }
    };
    if satisfied {
        return Ok(StepRun {
            satisfied: true,
            probe: pre.describe(),
            actions: Vec::new(),
        });
    }

    let actions = run_source_actions(ctx, step).await?;

    let post = step
        .effective_postcondition()
        .ok_or_else(|| Error::internal(format!("step '{}' has no condition", step.name)))?;
    match probe::evaluate(post).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(VerificationError::Unsatisfied {
                step: step.name.clone(),
                probe: post.describe(),
            }
            .into());
        }
        Err(e) => {
            return Err(VerificationError::ProbeFailed {
                step: step.name.clone(),
                message: e.to_string(),
            }
            .into());
        }
    }

    Ok(StepRun {
        satisfied: false,
        probe: post.describe(),
        actions,
    })
}

async fn run_source_actions(ctx: &RunContext, step: &Step) -> Result<Vec<String>, Error> {
    let mut actions = Vec::new();

    let mut artifact_path = None;
    if let Some(artifact) = &step.artifact {
        let dest = artifact.local_path(&ctx.download_dir);
        if path_present(&dest).await? {
            ctx.emit(AppEvent::Download(DownloadEvent::AlreadyPresent {
                url: artifact.url.clone(),
                path: dest.display().to_string(),
            }));
        } else {
            rigup_net::download_file(&ctx.net, &artifact.url, &dest, &ctx.tx).await?;
            actions.push(format!("fetch {}", artifact.url));
        }

        // verify the artifact at rest, downloaded just now or long ago
        if artifact.min_size.is_some() || artifact.blake3.is_some() {
            verify::verify_artifact(&dest, artifact.min_size, artifact.blake3.as_deref()).await?;
            actions.push(format!("verify {}", dest.display()));
        }
        artifact_path = Some(dest);
    }

    let mut unpack_dest = None;
    if let Some(unpack) = &step.unpack {
        let archive_path = artifact_path.as_ref().ok_or_else(|| {
            Error::internal(format!(
                "step '{}' declares unpack without an artifact",
                step.name
            ))
        })?;

        if path_present(&unpack.dest).await? {
            ctx.emit(AppEvent::Extract(ExtractEvent::Skipped {
                dest: unpack.dest.display().to_string(),
            }));
        } else {
            ctx.emit(AppEvent::Extract(ExtractEvent::Started {
                archive: archive_path.display().to_string(),
                dest: unpack.dest.display().to_string(),
            }));
            let started = Instant::now();

            archive::extract(archive_path, &unpack.extract_root()).await?;
            if !path_present(&unpack.dest).await? {
                return Err(ExtractError::DestinationMissing {
                    path: archive_path.display().to_string(),
                    dest: unpack.dest.display().to_string(),
                }
                .into());
            }

            ctx.emit(AppEvent::Extract(ExtractEvent::Completed {
                archive: archive_path.display().to_string(),
                dest: unpack.dest.display().to_string(),
                duration: started.elapsed(),
            }));
            actions.push(format!("unpack {}", archive_path.display()));
        }
        unpack_dest = Some(unpack.dest.clone());
    }

    for command in &step.build {
        let rendered = command.display();
        // commands without an explicit workdir run inside the unpacked tree
        let workdir: Option<PathBuf> = command.workdir.clone().or_else(|| unpack_dest.clone());

        ctx.emit(AppEvent::Build(BuildEvent::CommandStarted {
            command: rendered.clone(),
            workdir: workdir
                .as_ref()
                .map_or_else(|| ".".to_string(), |dir| dir.display().to_string()),
        }));
        let started = Instant::now();

        let result = timeout::with_optional_timeout(
            exec::run_command(&command.argv, &command.env, workdir.as_deref()),
            ctx.command_timeout,
            &rendered,
        )
        .await?;
        if !result.success {
            return Err(BuildError::CommandFailed {
                command: rendered,
                exit_code: result.exit_code,
                stderr: result.stderr,
            }
            .into());
        }

        ctx.emit(AppEvent::Build(BuildEvent::CommandCompleted {
            command: rendered.clone(),
            duration: started.elapsed(),
        }));
        actions.push(format!("run {rendered}"));
    }

    Ok(actions)
}

async fn path_present(path: &Path) -> Result<bool, Error> {
    match tokio::fs::metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}
