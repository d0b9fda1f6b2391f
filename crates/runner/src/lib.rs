#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Sequential step runner for rigup
//!
//! This crate walks a plan's steps in declaration order and makes each one
//! true: probe the precondition, skip the step if it already holds, run the
//! step's actions otherwise, then prove the postcondition. The first failing
//! step aborts the run; nothing is rolled back and nothing after it runs.
//!
//! Re-running a plan is the intended recovery path. Steps whose
//! preconditions now hold are skipped, so a rerun resumes where the last
//! run stopped.

mod archive;
mod exec;
mod package;
mod probe;
mod report;
mod step;
mod timeout;
mod verify;

pub use exec::CommandResult;
pub use report::{CheckOutcome, CheckReport, RunResult, StepFailure, StepOutcome, StepStatus};

use rigup_events::{AppEvent, EventEmitter, EventSender, FailureContext, RunEvent};
use rigup_net::NetClient;
use rigup_plan::{Plan, Step};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

/// Everything a run needs besides the plan itself.
pub struct RunContext {
    pub(crate) tx: EventSender,
    pub(crate) net: NetClient,
    pub(crate) download_dir: PathBuf,
    pub(crate) command_timeout: Option<u64>,
}

impl RunContext {
    #[must_use]
    pub fn new(tx: EventSender, net: NetClient, download_dir: PathBuf) -> Self {
        Self {
            tx,
            net,
            download_dir,
            command_timeout: None,
        }
    }

    /// Cap each build command at `seconds` seconds. `None` leaves build
    /// commands unbounded.
    #[must_use]
    pub fn with_command_timeout(mut self, seconds: Option<u64>) -> Self {
        self.command_timeout = seconds;
        self
    }
}

impl EventEmitter for RunContext {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Run every step of a plan in order.
pub async fn run(ctx: &RunContext, plan: &Plan) -> RunResult {
    run_steps(ctx, plan.name.as_deref(), &plan.steps).await
}

/// Run a selection of steps in order, aborting at the first failure.
///
/// Steps after a failed one are never started. The returned [`RunResult`]
/// records an outcome for every step that was reached and names the failed
/// step, if any.
pub async fn run_steps(ctx: &RunContext, plan_name: Option<&str>, steps: &[Step]) -> RunResult {
    let run_started = Instant::now();
    ctx.emit(AppEvent::Run(RunEvent::Started {
        plan: plan_name.unwrap_or("plan").to_string(),
        total_steps: steps.len(),
    }));

    let mut outcomes = Vec::new();
    let mut failure = None;

    for (index, step) in steps.iter().enumerate() {
        ctx.emit(AppEvent::Run(RunEvent::StepStarted {
            step: step.name.clone(),
            index: index + 1,
            total: steps.len(),
        }));
        debug!(step = %step.name, kind = %step.kind(), "evaluating step");
        let step_started = Instant::now();

        match step::run_step(ctx, step).await {
            Ok(outcome) if outcome.satisfied => {
                ctx.emit(AppEvent::Run(RunEvent::StepSkipped {
                    step: step.name.clone(),
                    probe: outcome.probe,
                }));
                outcomes.push(StepOutcome {
                    step: step.name.clone(),
                    status: StepStatus::Satisfied,
                    duration_ms: elapsed_ms(step_started),
                    actions: Vec::new(),
                });
            }
            Ok(outcome) => {
                ctx.emit(AppEvent::Run(RunEvent::StepProvisioned {
                    step: step.name.clone(),
                    duration: step_started.elapsed(),
                }));
                outcomes.push(StepOutcome {
                    step: step.name.clone(),
                    status: StepStatus::Provisioned,
                    duration_ms: elapsed_ms(step_started),
                    actions: outcome.actions,
                });
            }
            Err(error) => {
                ctx.emit(AppEvent::Run(RunEvent::StepFailed {
                    step: step.name.clone(),
                    failure: FailureContext::from_error(&error),
                }));
                outcomes.push(StepOutcome {
                    step: step.name.clone(),
                    status: StepStatus::Failed,
                    duration_ms: elapsed_ms(step_started),
                    actions: Vec::new(),
                });
                failure = Some(StepFailure {
                    step: step.name.clone(),
                    error,
                });
                break;
            }
        }
    }

    let result = RunResult {
        plan: plan_name.map(str::to_string),
        outcomes,
        failure,
        duration_ms: elapsed_ms(run_started),
    };
    if result.success() {
        ctx.emit(AppEvent::Run(RunEvent::Completed {
            provisioned: result.provisioned(),
            satisfied: result.satisfied(),
            duration: run_started.elapsed(),
        }));
    }
    result
}

/// Probe every step of a plan without running any actions.
pub async fn check(ctx: &RunContext, plan: &Plan) -> CheckReport {
    check_steps(ctx, plan.name.as_deref(), &plan.steps).await
}

/// Probe a selection of steps without running any actions.
///
/// Probes are state-free, so a check never changes the system; it reports
/// which steps a run would skip and which it would provision.
pub async fn check_steps(
    ctx: &RunContext,
    plan_name: Option<&str>,
    steps: &[Step],
) -> CheckReport {
    let mut rows = Vec::new();

    for step in steps {
        let outcome = if let Some(set) = &step.packages {
            let enabled = set.enabled_names();
            let missing = package::probe_missing(ctx, set, &enabled).await;
            CheckOutcome {
                step: step.name.clone(),
                probe: package::probe_label(set),
                satisfied: missing.is_empty(),
                note: (!missing.is_empty()).then(|| format!("missing: {}", missing.join(", "))),
            }
        } else if let Some(pre) = step.effective_precondition() {
            match probe::evaluate(pre).await {
                Ok(satisfied) => CheckOutcome {
                    step: step.name.clone(),
                    probe: pre.describe(),
                    satisfied,
                    note: None,
                },
                Err(e) => CheckOutcome {
                    step: step.name.clone(),
                    probe: pre.describe(),
                    satisfied: false,
                    note: Some(format!("probe failed: {e}")),
                },
            }
        } else {
            // a validated plan never reaches here
            CheckOutcome {
                step: step.name.clone(),
                probe: "none".to_string(),
                satisfied: false,
                note: Some("step declares no condition".to_string()),
            }
        };
        rows.push(outcome);
    }

    CheckReport {
        plan: plan_name.map(str::to_string),
        steps: rows,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
