//! Cadence CLI - run tree-shaped interval routines.
//!
//! A routine file describes a tree of timed steps: single countdowns,
//! back-to-back sequences, and repeated loops. This binary builds the
//! tree, drives it off a wall-clock tick, and prints one line per event.

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tokio::time::Duration;

use cadence::cli::{Cli, Commands, Display, RunArgs};
use cadence::engine::{start_routine, TokioCountdown};
use cadence::types::RoutineConfig;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    // Set verbose logging if requested
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => run_routine(&args).await,
        Some(Commands::Show { file }) => {
            let config = load_routine(&file)?;
            Display::show_summary(&config);
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            Ok(())
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Loads and validates a routine file.
fn load_routine(path: &Path) -> Result<RoutineConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read routine file {}", path.display()))?;
    let config: RoutineConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse routine file {}", path.display()))?;
    config.timer.validate()?;
    tracing::debug!(routine = %config.name, ticks = config.timer.total_duration(), "loaded routine");
    Ok(config)
}

/// Runs a routine to completion, printing one line per event.
async fn run_routine(args: &RunArgs) -> Result<()> {
    let config = load_routine(&args.file)?;
    tracing::info!(routine = %config.name, "starting routine");

    let json = args.json;
    let period = Duration::from_millis(args.tick_ms);

    // Countdowns spawn local tasks; keep everything on one LocalSet.
    let local = LocalSet::new();
    local
        .run_until(async move {
            if !json {
                Display::show_run_header(&config);
            }

            let (tx, mut rx) = mpsc::unbounded_channel();
            let countdown = Rc::new(TokioCountdown::with_period(period));
            let timer = start_routine(&config.timer, countdown, move |event| {
                // The receiver half decides when to stop listening.
                let _ = tx.send(event);
            });

            if !timer.state().status().is_on() {
                // Degenerate routine (no units to run): nothing will ever
                // fire, so don't wait for it.
                if !json {
                    Display::show_finished(&config.name);
                }
                return Ok(());
            }

            while let Some(event) = rx.recv().await {
                let terminal = event.event.is_done();
                if json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    Display::show_event(&event);
                }
                if terminal {
                    break;
                }
            }
            if !json {
                Display::show_finished(&config.name);
            }
            Ok(())
        })
        .await
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
