#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Plan loading and validation for rigup
//!
//! A plan is a TOML file with an ordered list of `[[step]]` tables. Loading
//! parses the file, expands `~/` prefixes in path fields against the
//! operator's home directory, and validates the shape of every step before
//! the runner sees it.

mod model;

pub use model::{
    Artifact, BuildCommand, PackageEntry, PackageSet, Plan, Probe, Step, StepKind, Unpack,
};

use rigup_errors::{Error, PlanError};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;

impl FromStr for Plan {
    type Err = Error;

    fn from_str(contents: &str) -> Result<Self, Error> {
        let mut plan: Self = toml::from_str(contents).map_err(|e| PlanError::ParseError {
            message: e.to_string(),
        })?;
        plan.normalize();
        plan.validate()?;
        Ok(plan)
    }
}

impl Plan {
    /// Load and validate a plan from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML does not parse,
    /// or validation rejects a step.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlanError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                PlanError::ReadError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;
        contents.parse()
    }

    /// Validate the plan's shape
    ///
    /// # Errors
    ///
    /// Returns an error for an empty plan, duplicate or empty step names,
    /// steps without any condition, package steps mixing in source-install
    /// fields, malformed artifact declarations, or empty command argvs.
    pub fn validate(&self) -> Result<(), Error> {
        if self.steps.is_empty() {
            return Err(PlanError::Empty.into());
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(PlanError::InvalidStep {
                    step: step.name.clone(),
                    message: "step name is empty".to_string(),
                }
                .into());
            }
            if !seen.insert(step.name.clone()) {
                return Err(PlanError::DuplicateStep {
                    name: step.name.clone(),
                }
                .into());
            }

            if let Some(set) = &step.packages {
                validate_packages_step(step, set)?;
            } else {
                validate_source_step(step)?;
            }
        }

        Ok(())
    }

    /// Select a subset of steps by name, preserving plan order
    ///
    /// An empty selection means every step.
    ///
    /// # Errors
    ///
    /// Returns an error if a requested name does not exist in the plan.
    pub fn select(&self, only: &[String]) -> Result<Vec<Step>, Error> {
        if only.is_empty() {
            return Ok(self.steps.clone());
        }

        for name in only {
            if !self.steps.iter().any(|s| &s.name == name) {
                return Err(PlanError::UnknownStep { name: name.clone() }.into());
            }
        }

        Ok(self
            .steps
            .iter()
            .filter(|s| only.contains(&s.name))
            .cloned()
            .collect())
    }

    /// Summarize the plan for display
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        let steps = self
            .steps
            .iter()
            .map(|step| {
                let (detail, precondition, postcondition) = match &step.packages {
                    Some(set) => {
                        let enabled = set.enabled_names().len();
                        let probe = format!("{} <package>", set.probe.join(" "));
                        (
                            format!("{} of {} packages enabled", enabled, set.entries.len()),
                            Some(probe.clone()),
                            Some(probe),
                        )
                    }
                    None => (
                        step.artifact
                            .as_ref()
                            .map_or_else(|| "build only".to_string(), |a| a.url.clone()),
                        step.effective_precondition().map(Probe::describe),
                        step.effective_postcondition().map(Probe::describe),
                    ),
                };
                StepSummary {
                    name: step.name.clone(),
                    kind: step.kind().to_string(),
                    detail,
                    precondition,
                    postcondition,
                }
            })
            .collect();

        PlanSummary {
            name: self.name.clone(),
            total: self.steps.len(),
            steps,
        }
    }

    /// Expand `~/` prefixes in every path field.
    fn normalize(&mut self) {
        for step in &mut self.steps {
            if let Some(probe) = &mut step.precondition {
                normalize_probe(probe);
            }
            if let Some(probe) = &mut step.postcondition {
                normalize_probe(probe);
            }
            if let Some(artifact) = &mut step.artifact {
                if let Some(path) = &mut artifact.path {
                    *path = expand_home(path);
                }
            }
            if let Some(unpack) = &mut step.unpack {
                unpack.dest = expand_home(&unpack.dest);
            }
            for cmd in &mut step.build {
                if let Some(workdir) = &mut cmd.workdir {
                    *workdir = expand_home(workdir);
                }
            }
        }
    }
}

/// Plan summary for the `list` command
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub name: Option<String>,
    pub total: usize,
    pub steps: Vec<StepSummary>,
}

/// One step's row in the plan summary
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub name: String,
    pub kind: String,
    pub detail: String,
    pub precondition: Option<String>,
    pub postcondition: Option<String>,
}

fn validate_packages_step(step: &Step, set: &PackageSet) -> Result<(), Error> {
    let invalid = |message: &str| -> Error {
        PlanError::InvalidStep {
            step: step.name.clone(),
            message: message.to_string(),
        }
        .into()
    };

    if step.artifact.is_some() || step.unpack.is_some() || !step.build.is_empty() {
        return Err(invalid(
            "a packages step cannot also declare artifact, unpack, or build",
        ));
    }
    if step.precondition.is_some() || step.postcondition.is_some() {
        return Err(invalid(
            "a packages step derives its conditions from the probe list",
        ));
    }
    if set.entries.is_empty() {
        return Err(invalid("package table is empty"));
    }
    if set.manager.trim().is_empty() {
        return Err(invalid("package manager is empty"));
    }
    if set.probe.is_empty() {
        return Err(invalid("package probe command is empty"));
    }
    for entry in &set.entries {
        if entry.name.trim().is_empty() {
            return Err(invalid("package entry with empty name"));
        }
    }

    Ok(())
}

fn validate_source_step(step: &Step) -> Result<(), Error> {
    let invalid = |message: String| -> Error {
        PlanError::InvalidStep {
            step: step.name.clone(),
            message,
        }
        .into()
    };

    if step.effective_precondition().is_none() {
        return Err(PlanError::MissingCondition {
            step: step.name.clone(),
        }
        .into());
    }
    if step.artifact.is_none() && step.unpack.is_none() && step.build.is_empty() {
        return Err(invalid("step declares no actions".to_string()));
    }
    if step.unpack.is_some() && step.artifact.is_none() {
        return Err(invalid("unpack requires an artifact".to_string()));
    }

    if let Some(artifact) = &step.artifact {
        if let Err(e) = url::Url::parse(&artifact.url) {
            return Err(invalid(format!("invalid artifact URL: {e}")));
        }
        if let Some(hash) = &artifact.blake3 {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid("blake3 must be 64 hex characters".to_string()));
            }
        }
    }

    for (idx, cmd) in step.build.iter().enumerate() {
        if cmd.argv.is_empty() || cmd.argv[0].trim().is_empty() {
            return Err(invalid(format!("build command {} has an empty argv", idx + 1)));
        }
    }

    for probe in [&step.precondition, &step.postcondition].into_iter().flatten() {
        if let Probe::Command { command } = probe {
            if command.is_empty() || command[0].trim().is_empty() {
                return Err(invalid("probe command is empty".to_string()));
            }
        }
    }

    Ok(())
}

fn normalize_probe(probe: &mut Probe) {
    match probe {
        Probe::File { file } => *file = expand_home(file),
        Probe::Dir { dir } => *dir = expand_home(dir),
        Probe::Path { path } => *path = expand_home(path),
        Probe::Command { .. } => {}
    }
}

/// Expand a leading `~` component to the operator's home directory.
fn expand_home(path: &Path) -> PathBuf {
    expand_home_with(path, dirs::home_dir().as_deref())
}

fn expand_home_with(path: &Path, home: Option<&Path>) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_leading_tilde_only() {
        let home = Path::new("/home/op");
        assert_eq!(
            expand_home_with(Path::new("~/tess"), Some(home)),
            PathBuf::from("/home/op/tess")
        );
        assert_eq!(
            expand_home_with(Path::new("~"), Some(home)),
            PathBuf::from("/home/op")
        );
        // Not a home reference, left alone
        assert_eq!(
            expand_home_with(Path::new("/opt/~weird"), Some(home)),
            PathBuf::from("/opt/~weird")
        );
        assert_eq!(
            expand_home_with(Path::new("~user/x"), Some(home)),
            PathBuf::from("~user/x")
        );
        // No home known, left alone
        assert_eq!(
            expand_home_with(Path::new("~/tess"), None),
            PathBuf::from("~/tess")
        );
    }
}
