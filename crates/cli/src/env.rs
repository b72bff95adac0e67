// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `FITSYNC_STATE_DIR` if set and non-empty.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::FITSYNC_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `FITSYNC_TOKEN` if set and non-empty.
pub fn token() -> Option<String> {
    non_empty(vars::FITSYNC_TOKEN)
}

/// Returns the value of `XDG_STATE_HOME` if set and non-empty.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty(vars::XDG_STATE_HOME).map(PathBuf::from)
}

/// Returns `true` if `RUST_LOG` is set.
pub fn rust_log_set() -> bool {
    std::env::var_os(vars::RUST_LOG).is_some()
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
