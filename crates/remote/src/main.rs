// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fit-remote: reference WebSocket server for fitsync clients.
//!
//! Stores workouts in SQLite, keyed by owner and client workout id so that
//! replayed creates and deletes are harmless.

mod server;
mod state;
mod store;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// fit-remote: workout sync server
#[derive(Parser, Debug)]
#[command(name = "fit-remote")]
#[command(about = "Reference WebSocket server for fitsync workout sync")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Directory for the workout database
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let default = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting fit-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Data directory: {}", args.data.display());

    let state = state::ServerState::new(&args.data)?;
    server::run(args.bind, state).await?;

    Ok(())
}
