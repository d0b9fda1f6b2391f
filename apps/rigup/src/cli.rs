//! Command line interface definition

use clap::{Parser, Subcommand};
use rigup_config::ColorChoice;
use std::path::PathBuf;

/// rigup - Idempotent provisioning runner
#[derive(Parser)]
#[command(name = "rigup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Idempotent provisioning runner for source-built tool installs")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use alternate plan file
    #[arg(long, global = true, value_name = "PATH")]
    pub plan: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Provision every step whose precondition does not already hold
    Run {
        /// Limit the run to the named steps, in plan order
        #[arg(long, value_name = "STEP")]
        only: Vec<String>,
    },

    /// Probe every step without changing the machine
    Check {
        /// Limit the check to the named steps, in plan order
        #[arg(long, value_name = "STEP")]
        only: Vec<String>,
    },

    /// List the steps in the plan
    #[command(alias = "ls")]
    List,
}
