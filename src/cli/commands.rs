//! Command definitions for the cadence CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Cadence - interval timer for guided routines
#[derive(Parser, Debug)]
#[command(
    name = "cadence",
    version,
    about = "Run tree-shaped interval routines from declarative JSON files",
    long_about = "Cadence runs guided routines described as trees of timed steps:\n\
                  single countdowns, back-to-back sequences, and repeated loops.\n\
                  Every elapsed tick is reported together with a snapshot of the\n\
                  whole tree, so a frontend can render progress at any depth.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a routine file to completion
    Run(RunArgs),

    /// Print a routine's structure and total duration without running it
    Show {
        /// Path to the routine file
        file: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to the routine file
    pub file: PathBuf,

    /// Print one raw JSON line per event instead of the human display
    #[arg(long)]
    pub json: bool,

    /// Tick period in milliseconds
    #[arg(
        long,
        default_value = "1000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_ms: u64,
}

// ============================================================================
// Tests
// ============================================================================
