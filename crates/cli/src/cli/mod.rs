// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "fitsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Log workouts offline and sync them when the network returns")]
#[command(
    long_about = "Log workouts offline and sync them when the network returns.\n\n\
    Every change is written to a durable local queue first and replayed\n\
    against the remote API in order once it is reachable."
)]
pub struct Cli {
    /// Use <path> as the state directory
    #[arg(long, global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log a workout
    #[command(after_help = "\
Examples:
  fitsync log push-up 20                 Queue 20 push-ups
  fitsync log plank 90 --unit seconds    Queue a 90 second plank
  fitsync log run 5 -u km --sync         Queue a 5 km run and sync now")]
    Log {
        /// Exercise name (e.g. push-up, squat, run)
        #[arg(value_parser = non_empty_string)]
        exercise: String,

        /// Amount performed
        amount: f64,

        /// Unit: reps, seconds, minutes, meters, kilometers
        #[arg(long, short, default_value = "reps")]
        unit: String,

        /// Sync immediately after queueing
        #[arg(long)]
        sync: bool,
    },

    /// Delete a previously logged workout
    Delete {
        /// Client workout id printed by `fitsync log`
        #[arg(value_parser = non_empty_string)]
        workout_id: String,

        /// Sync immediately after queueing
        #[arg(long)]
        sync: bool,
    },

    /// List mutations waiting to be synced
    Pending {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Replay pending mutations against the remote now
    Sync,

    /// Show connectivity, identity and queue status
    Status,

    /// Keep syncing in the foreground until interrupted
    #[command(after_help = "\
Watch probes the remote, drains the queue whenever it becomes reachable,
and prints state changes as they happen. Stop with Ctrl-C.")]
    Watch,

    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Set the remote WebSocket URL
    Remote {
        /// URL such as ws://127.0.0.1:7890
        url: String,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
