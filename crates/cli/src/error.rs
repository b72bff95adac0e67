// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{QueueError, RemoteError};

/// Errors surfaced by the fitsync CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no remote configured\n  hint: run 'fitsync config remote ws://host:port'")]
    NoRemote,

    #[error("no identity configured\n  hint: set FITSYNC_TOKEN or add a 'token' key to config.toml")]
    NoIdentity,

    #[error("invalid remote url '{url}': {reason}\n  hint: use ws://host:port or wss://host")]
    InvalidRemoteUrl { url: String, reason: String },

    #[error(transparent)]
    Core(#[from] fit_core::Error),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
