//! rigup - Idempotent provisioning runner
//!
//! This is the main CLI application that drives plan loading, probing,
//! and step execution through the runner crate.

mod cli;
mod display;
mod error;
mod events;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::{OperationResult, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use rigup_config::Config;
use rigup_events::EventReceiver;
use rigup_net::{NetClient, NetConfig};
use rigup_plan::Plan;
use rigup_runner::RunContext;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    // Initialize tracing with JSON awareness
    init_tracing(json_mode, cli.global.debug);

    // Run the application and handle errors
    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting rigup v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(&cli.global.config).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global);

    // A broken plan aborts before anything else happens
    let plan = Plan::load(&plan_path(&cli.global, &config)).await?;

    // Create event channel
    let (event_sender, event_receiver) = rigup_events::channel();

    // Build the run context
    let ctx = RunContext::new(event_sender, build_net_client(&config)?, config.download_dir())
        .with_command_timeout(config.build.command_timeout);

    // Create output renderer
    let renderer = OutputRenderer::new(
        cli.global.json,
        cli.global.color.unwrap_or(config.general.color),
    );

    // Create event handler
    let mut event_handler = EventHandler::new(cli.global.debug);

    // Execute command with event handling
    let result =
        execute_command_with_events(cli.command, ctx, plan, event_receiver, &mut event_handler)
            .await?;

    // Render final result
    renderer.render_result(&result)?;

    // A failed step is rendered above, then exits with the code of its class
    if let OperationResult::Run(report) = result {
        if let Some(failure) = report.failure {
            return Err(CliError::Op(failure.error));
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ctx: RunContext,
    plan: Plan,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ctx, plan));

    // Handle events concurrently with command execution
    loop {
        select! {
            // Command completed
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            // Event received
            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    ctx: RunContext,
    plan: Plan,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Run { only } => {
            let steps = plan.select(&only)?;
            let report = rigup_runner::run_steps(&ctx, plan.name.as_deref(), &steps).await;
            Ok(OperationResult::Run(report))
        }

        Commands::Check { only } => {
            let steps = plan.select(&only)?;
            let report = rigup_runner::check_steps(&ctx, plan.name.as_deref(), &steps).await;
            Ok(OperationResult::Check(report))
        }

        Commands::List => Ok(OperationResult::Steps(plan.summary())),
    }
}

/// Resolve the plan path: CLI flag first, then config, then ./plan.toml
fn plan_path(global: &GlobalArgs, config: &Config) -> PathBuf {
    global.plan.clone().unwrap_or_else(|| config.plan_path())
}

/// Build the HTTP client from the network configuration
fn build_net_client(config: &Config) -> Result<NetClient, CliError> {
    let net_config = NetConfig {
        timeout: Duration::from_secs(config.network.timeout),
        connect_timeout: Duration::from_secs(config.network.connect_timeout),
        retry_count: config.network.retries,
        retry_delay: Duration::from_secs(config.network.retry_delay),
        ..NetConfig::default()
    };
    Ok(NetClient::new(net_config)?)
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    // Global CLI flags override everything
    if let Some(color) = &global.color {
        config.general.color = *color;
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if json_mode {
        if debug_enabled {
            // Structured logs on stderr; stdout stays clean for the JSON result
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new("info,rigup=debug,rigup_runner=debug")
                    }),
                )
                .init();
        } else {
            // Disable all logging in JSON mode
            tracing_subscriber::fmt()
                .with_writer(std::io::sink)
                .with_env_filter("off")
                .init();
        }
    } else if debug_enabled {
        // Debug mode: verbose logs to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,rigup=debug,rigup_runner=debug")
                }),
            )
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,rigup=warn,rigup_runner=warn")
                }),
            )
            .init();
    }
}
