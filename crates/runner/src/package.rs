//! Package set provisioning
//!
//! A packages step derives its conditions from the declared probe: each
//! enabled entry is probed before installing, only the missing ones are
//! passed to the manager in a single invocation, and every installed entry
//! is re-probed afterwards.

use crate::exec;
use crate::step::StepRun;
use rigup_errors::{BuildError, Error, VerificationError};
use rigup_events::{AppEvent, EventEmitter, PackageEvent};
use rigup_plan::PackageSet;
use std::collections::HashMap;
use std::time::Instant;

pub(crate) async fn run_packages_step<E: EventEmitter>(
    emitter: &E,
    step_name: &str,
    set: &PackageSet,
) -> Result<StepRun, Error> {
    let enabled = set.enabled_names();
    let probe = probe_label(set);

    emitter.emit(AppEvent::Package(PackageEvent::Probing {
        manager: set.manager.clone(),
        total: enabled.len(),
    }));

    let missing = probe_missing(emitter, set, &enabled).await;
    if missing.is_empty() {
        return Ok(StepRun {
            satisfied: true,
            probe,
            actions: Vec::new(),
        });
    }

    emitter.emit(AppEvent::Package(PackageEvent::Missing {
        names: missing.clone(),
    }));

    let argv = set.install_argv(&missing);
    let rendered = argv.join(" ");

    emitter.emit(AppEvent::Package(PackageEvent::InstallStarted {
        manager: set.manager.clone(),
        packages: missing.clone(),
    }));
    let started = Instant::now();

    let result = exec::run_command(&argv, &HashMap::new(), None).await?;
    if !result.success {
        return Err(BuildError::CommandFailed {
            command: rendered,
            exit_code: result.exit_code,
            stderr: result.stderr,
        }
        .into());
    }

    emitter.emit(AppEvent::Package(PackageEvent::InstallCompleted {
        manager: set.manager.clone(),
        installed: missing.len(),
        duration: started.elapsed(),
    }));

    // the install claimed success; every entry must now probe present
    for name in &missing {
        match exec::probe_command(&set.probe_argv(name)).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(VerificationError::Unsatisfied {
                    step: step_name.to_string(),
                    probe: format!("{} {name}", set.probe.join(" ")),
                }
                .into());
            }
            Err(e) => {
                return Err(VerificationError::ProbeFailed {
                    step: step_name.to_string(),
                    message: e.to_string(),
                }
                .into());
            }
        }
    }

    Ok(StepRun {
        satisfied: false,
        probe,
        actions: vec![format!("install {}", missing.join(" "))],
    })
}

/// Probe a step's enabled entries without installing anything.
///
/// Returns the names that are not currently installed.
pub(crate) async fn probe_missing<E: EventEmitter>(
    emitter: &E,
    set: &PackageSet,
    enabled: &[String],
) -> Vec<String> {
    let mut missing = Vec::new();
    for name in enabled {
        match exec::probe_command(&set.probe_argv(name)).await {
            Ok(true) => {}
            Ok(false) => missing.push(name.clone()),
            Err(e) => {
                emitter.emit_warning_with_context(
                    format!("could not probe package '{name}', treating it as missing"),
                    e.to_string(),
                );
                missing.push(name.clone());
            }
        }
    }
    missing
}

pub(crate) fn probe_label(set: &PackageSet) -> String {
    format!("{} <package>", set.probe.join(" "))
}
