//! Display utilities for the cadence CLI.
//!
//! This module provides formatted output for:
//! - The per-event progress lines printed while a routine runs
//! - The routine summary shown by the `show` command
//! - Error messages

use crate::types::{RoutineConfig, RoutineEvent, Target, TimerConfig};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the header printed before a routine starts.
    pub fn show_run_header(config: &RoutineConfig) {
        let (minutes, seconds) = Self::format_time(config.timer.total_duration());
        println!("{} ({}:{:02})", config.name, minutes, seconds);
    }

    /// Shows a single timer event as one progress line.
    pub fn show_event(event: &RoutineEvent) {
        match &event.event.target {
            Target::Tick { id, remaining } => {
                let (minutes, seconds) = Self::format_time(*remaining);
                println!("  {}  {}:{:02} left", id, minutes, seconds);
            }
            Target::Done { id } => {
                println!("* {} complete", id);
            }
        }
    }

    /// Shows the closing line after a routine finishes.
    pub fn show_finished(name: &str) {
        println!("Routine '{}' finished", name);
    }

    /// Shows a routine's structure and total duration.
    pub fn show_summary(config: &RoutineConfig) {
        let (minutes, seconds) = Self::format_time(config.timer.total_duration());
        println!("{}", config.name);
        println!("Total: {}:{:02}", minutes, seconds);
        Self::show_tree(&config.timer, 1);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Recursively prints one line per config node, indented by depth.
    fn show_tree(config: &TimerConfig, depth: usize) {
        let indent = "  ".repeat(depth);
        match config {
            TimerConfig::Unit { name, duration, .. } => {
                let (minutes, seconds) = Self::format_time(*duration);
                println!("{}- {} ({}:{:02})", indent, name, minutes, seconds);
            }
            TimerConfig::Sequence { of, .. } => {
                println!("{}sequence of {}:", indent, of.len());
                for child in of {
                    Self::show_tree(child, depth + 1);
                }
            }
            TimerConfig::Loop { times, of, .. } => {
                println!("{}repeat x{}:", indent, (*times).max(0));
                Self::show_tree(of, depth + 1);
            }
        }
    }

    /// Splits a tick count into (minutes, seconds) for mm:ss display.
    fn format_time(total_seconds: u32) -> (u32, u32) {
        (total_seconds / 60, total_seconds % 60)
    }
}

// ============================================================================
// Tests
// ============================================================================
