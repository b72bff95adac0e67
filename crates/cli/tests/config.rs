// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;

#[test]
fn show_defaults() {
    let temp = TempDir::new().unwrap();
    fitsync(temp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[sync]"))
        .stdout(predicate::str::contains("interval_secs = 60"))
        .stdout(predicate::str::contains("[remote]").not());
}

#[test]
fn set_remote_then_show() {
    let temp = TempDir::new().unwrap();

    fitsync(temp.path())
        .args(["config", "remote", "ws://127.0.0.1:7890"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote set to ws://127.0.0.1:7890"));

    fitsync(temp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("url = \"ws://127.0.0.1:7890\""))
        .stdout(predicate::str::contains("reply_timeout_secs = 10"));
}

#[test]
fn set_remote_rejects_non_websocket_url() {
    let temp = TempDir::new().unwrap();
    fitsync(temp.path())
        .args(["config", "remote", "https://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid remote url"));

    assert!(!temp.path().join("config.toml").exists());
}

#[test]
fn show_masks_token() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "ws://127.0.0.1:7890", Some("very-secret-token"));

    fitsync(temp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("very-secret-token").not())
        .stdout(predicate::str::contains("token = \"identity:"));
}

#[test]
fn malformed_config_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "[remote\n").unwrap();

    fitsync(temp.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config parse error"));
}
