// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fitsync - offline-first workout logging with background sync.
//!
//! Workouts are written to a durable local queue first and replayed against
//! the remote API, in order, once it is reachable.
//!
//! # Main Components
//!
//! - [`sync::MutationQueue`] - durable JSONL queue of pending mutations
//! - [`sync::SyncEngine`] - drains the queue against the remote API
//! - [`sync::ConnectivityMonitor`] - online/offline state and the offline guard
//! - [`sync::StateBus`] - observable pending count, syncing flag, dropped mutations
//! - [`Config`] - client configuration
//! - [`Error`] - error type for CLI operations
//!
//! ```rust,ignore
//! use fitsync::sync::{MutationQueue, SyncEngine, StateBus, EngineConfig};
//!
//! let queue = MutationQueue::open(&queue_path, node_id)?;
//! let engine = SyncEngine::new(api, queue, StateBus::new(), EngineConfig::default());
//! let _sub = engine.on_pending_count_change(|n| println!("pending: {n}"));
//! engine.enqueue_workout_create(fields)?;
//! engine.initialize(identity).await;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod env;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, ConfigCommand, OutputFormat};
pub use config::{Config, RemoteConfig, SyncSettings};
pub use error::{Error, Result};

use commands::Context;

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without a process.
pub fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose);
    let ctx = Context::load(cli.state_dir.as_deref())?;

    match cli.command {
        Command::Log {
            exercise,
            amount,
            unit,
            sync,
        } => commands::log::run(&ctx, exercise, amount, unit, sync),
        Command::Delete { workout_id, sync } => commands::delete::run(&ctx, workout_id, sync),
        Command::Pending { output } => commands::pending::run(&ctx, output),
        Command::Sync => commands::sync::run(&ctx),
        Command::Status => commands::status::run(&ctx),
        Command::Watch => commands::watch::run(&ctx),
        Command::Config(cmd) => commands::config::run(&ctx, cmd),
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise warnings only, or debug output
/// for this crate with `--verbose`.
fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "fitsync=debug,info" } else { "warn" };
    let filter = if env::rust_log_set() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    } else {
        EnvFilter::new(default)
    };

    // A subscriber may already be installed when run() is called twice.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
