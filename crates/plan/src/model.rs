//! Plan data model
//!
//! A plan is an ordered list of provisioning steps. Each step pairs boolean
//! probes (is the capability already there?) with the actions that establish
//! it: fetch an artifact, verify it, unpack it, run build commands, or drive
//! the system package manager from a declarative entry table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A named boolean capability check.
///
/// Probes replace ad hoc shell tests: each one states the observation it
/// makes, and evaluation yields true, false, or an error. Errors are never
/// treated as "satisfied".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Probe {
    /// True iff spawning the command succeeds with exit status 0.
    /// A missing executable counts as false, not as an error.
    Command { command: Vec<String> },

    /// True iff the path exists and is a regular file.
    File { file: PathBuf },

    /// True iff the path exists and is a directory.
    Dir { dir: PathBuf },

    /// True iff the path exists, whatever its kind.
    Path { path: PathBuf },
}

impl Probe {
    /// Human-readable description used in skip notices and failure reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Command { command } => format!("command {}", command.join(" ")),
            Self::File { file } => format!("file {}", file.display()),
            Self::Dir { dir } => format!("dir {}", dir.display()),
            Self::Path { path } => format!("path {}", path.display()),
        }
    }
}

/// A remote artifact and how to check it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Where the artifact is fetched from.
    pub url: String,

    /// Local path for the artifact. Relative paths land under the download
    /// directory; when absent the URL's final segment names the file there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Integrity floor: the file must be at least this many bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,

    /// Expected blake3 hash of the file, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blake3: Option<String>,
}

impl Artifact {
    /// File name derived from the URL's final path segment.
    #[must_use]
    pub fn url_file_name(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let name = parsed.path_segments()?.next_back()?.to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Resolve where the artifact lives on disk.
    ///
    /// An explicit absolute `path` wins; a relative one is joined onto
    /// `download_dir`; with no `path` the URL file name is used.
    #[must_use]
    pub fn local_path(&self, download_dir: &Path) -> PathBuf {
        match &self.path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => download_dir.join(p),
            None => {
                let name = self.url_file_name().unwrap_or_else(|| "artifact".to_string());
                download_dir.join(name)
            }
        }
    }
}

/// Archive unpack declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unpack {
    /// Directory the archive is expected to produce. Extraction happens in
    /// the parent of this path; the directory existing afterwards is the
    /// unpack's own success check, and existing beforehand skips the unpack.
    pub dest: PathBuf,
}

impl Unpack {
    /// Directory the archive is extracted into.
    #[must_use]
    pub fn extract_root(&self) -> PathBuf {
        self.dest
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

/// One build command with its environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildCommand {
    /// Program and arguments, executed without a shell.
    pub argv: Vec<String>,

    /// Extra environment variables for this command. Compiler and linker
    /// flags belong here rather than inside the argv.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Working directory; defaults to the step's unpack destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
}

impl BuildCommand {
    /// Single-line rendering of the argv for events and errors.
    #[must_use]
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Declarative package table consumed by a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSet {
    /// Package manager binary.
    #[serde(default = "default_manager")]
    pub manager: String,

    /// Arguments placed between the manager and the package names.
    #[serde(default = "default_install_args")]
    pub install_args: Vec<String>,

    /// Probe command prefix; the package name is appended and exit status
    /// zero means the package is installed.
    #[serde(default = "default_probe")]
    pub probe: Vec<String>,

    /// The packages themselves, each individually switchable.
    pub entries: Vec<PackageEntry>,
}

/// One row of the package table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_manager() -> String {
    "apt-get".to_string()
}

fn default_install_args() -> Vec<String> {
    vec!["install".to_string(), "-y".to_string()]
}

fn default_probe() -> Vec<String> {
    vec!["dpkg".to_string(), "-s".to_string()]
}

fn default_true() -> bool {
    true
}

impl PackageSet {
    /// Names of the entries that are switched on, in table order.
    #[must_use]
    pub fn enabled_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.name.clone())
            .collect()
    }

    /// Probe argv for one package name.
    #[must_use]
    pub fn probe_argv(&self, name: &str) -> Vec<String> {
        let mut argv = self.probe.clone();
        argv.push(name.to_string());
        argv
    }

    /// Install argv for the given missing packages.
    #[must_use]
    pub fn install_argv(&self, missing: &[String]) -> Vec<String> {
        let mut argv = Vec::with_capacity(1 + self.install_args.len() + missing.len());
        argv.push(self.manager.clone());
        argv.extend(self.install_args.iter().cloned());
        argv.extend(missing.iter().cloned());
        argv
    }
}

/// What a step does, derived from which fields it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Fetch/verify/unpack/build pipeline.
    Source,
    /// Declarative package table.
    Packages,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Packages => write!(f, "packages"),
        }
    }
}

/// One provisioning step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Unique name within the plan.
    pub name: String,

    /// Probe consulted before acting; true means nothing to do.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precondition: Option<Probe>,

    /// Probe consulted after acting; false means the step failed to deliver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcondition: Option<Probe>,

    /// Remote artifact to ensure on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,

    /// Archive unpack declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpack: Option<Unpack>,

    /// Build commands, run in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build: Vec<BuildCommand>,

    /// Declarative package table. Mutually exclusive with the fields above.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<PackageSet>,
}

impl Step {
    /// Which pipeline this step runs.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        if self.packages.is_some() {
            StepKind::Packages
        } else {
            StepKind::Source
        }
    }

    /// Probe checked before acting. When only a postcondition is declared it
    /// doubles as the precondition, matching how a single capability check
    /// guards both ends of a step.
    #[must_use]
    pub fn effective_precondition(&self) -> Option<&Probe> {
        self.precondition.as_ref().or(self.postcondition.as_ref())
    }

    /// Probe checked after acting, falling back to the precondition.
    #[must_use]
    pub fn effective_postcondition(&self) -> Option<&Probe> {
        self.postcondition.as_ref().or(self.precondition.as_ref())
    }
}

/// A parsed provisioning plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Optional display name for the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Steps in execution order.
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}
