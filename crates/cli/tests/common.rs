// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `fitsync` isolated to `state`, with no ambient token or log filter.
pub fn fitsync(state: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("fitsync");
    cmd.env("FITSYNC_STATE_DIR", state)
        .env_remove("FITSYNC_TOKEN")
        .env_remove("RUST_LOG")
        .env_remove("XDG_STATE_HOME");
    cmd
}

/// Log a workout and return its client workout id.
pub fn log_workout(state: &Path, exercise: &str, amount: &str) -> String {
    let output = fitsync(state)
        .args(["log", exercise, amount])
        .output()
        .unwrap();
    assert!(output.status.success());

    // "Logged <exercise> <amount> <unit> (<id>)"
    let stdout = String::from_utf8_lossy(&output.stdout);
    let start = stdout.find('(').unwrap() + 1;
    let end = stdout.find(')').unwrap();
    stdout[start..end].to_string()
}

/// Write a config pointing at `url`, optionally with a token.
pub fn write_config(state: &Path, url: &str, token: Option<&str>) {
    let mut content = String::new();
    if let Some(token) = token {
        content.push_str(&format!("token = \"{}\"\n", token));
    }
    content.push_str(&format!(
        "[remote]\nurl = \"{}\"\nconnect_timeout_secs = 2\nreply_timeout_secs = 2\n",
        url
    ));
    std::fs::create_dir_all(state).unwrap();
    std::fs::write(state.join("config.toml"), content).unwrap();
}
