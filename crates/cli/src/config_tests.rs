// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn test_missing_config_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load(temp.path()).unwrap();
    assert_eq!(config, Config::default());
    assert!(config.remote.is_none());
    assert_eq!(config.sync.interval_secs, 60);
    assert_eq!(config.sync.probe_interval_secs, 10);
    assert_eq!(config.sync.max_server_error_attempts, 5);
}

#[test]
fn test_save_and_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("nested");
    let config = Config {
        token: Some("t-1".into()),
        remote: Some(RemoteConfig::new("ws://127.0.0.1:7890")),
        sync: SyncSettings {
            interval_secs: 30,
            ..SyncSettings::default()
        },
    };

    config.save(&dir).unwrap();

    assert_eq!(Config::load(&dir).unwrap(), config);
}

#[test]
fn test_partial_remote_section_uses_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "[remote]\nurl = \"ws://sync.example.com\"\n",
    )
    .unwrap();

    let config = Config::load(temp.path()).unwrap();
    let remote = config.remote.unwrap();
    assert_eq!(remote.connect_timeout(), Duration::from_secs(5));
    assert_eq!(remote.reply_timeout(), Duration::from_secs(10));
    assert_eq!(config.sync, SyncSettings::default());
}

#[test]
fn test_invalid_url_in_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "[remote]\nurl = \"http://sync.example.com\"\n",
    )
    .unwrap();

    let err = Config::load(temp.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidRemoteUrl { .. }));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "[remote\n").unwrap();

    assert!(matches!(
        Config::load(temp.path()),
        Err(Error::TomlParse(_))
    ));
}

#[parameterized(
    ws = { "ws://localhost:7890", true },
    wss = { "wss://sync.example.com/api", true },
    http = { "http://localhost", false },
    no_host = { "ws://", false },
    path_only = { "ws:///path", false },
    empty = { "", false },
)]
fn test_validate_url(url: &str, valid: bool) {
    assert_eq!(RemoteConfig::new(url).validate_url().is_none(), valid);
}

#[test]
fn test_identity_env_wins_over_file() {
    let config = Config {
        token: Some("file-token".into()),
        ..Config::default()
    };

    let from_env = config.identity_with(Some("env-token".into())).unwrap();
    let from_file = config.identity_with(None).unwrap();

    assert_eq!(from_env.unwrap().token(), "env-token");
    assert_eq!(from_file.unwrap().token(), "file-token");
}

#[test]
fn test_blank_token_means_no_identity() {
    let config = Config {
        token: Some("   ".into()),
        ..Config::default()
    };
    assert!(config.identity_with(None).unwrap().is_none());
    assert!(Config::default().identity_with(None).unwrap().is_none());
}

#[test]
fn test_require_remote_without_remote() {
    assert!(matches!(
        Config::default().require_remote(),
        Err(Error::NoRemote)
    ));
}

#[test]
fn test_state_dir_resolution_order() {
    let p = PathBuf::from;
    assert_eq!(
        resolve_state_dir(Some(p("/a")), Some(p("/b")), Some(p("/c")), Some(p("/h"))),
        p("/a")
    );
    assert_eq!(
        resolve_state_dir(None, Some(p("/b")), Some(p("/c")), Some(p("/h"))),
        p("/b")
    );
    assert_eq!(
        resolve_state_dir(None, None, Some(p("/c")), Some(p("/h"))),
        p("/c/fitsync")
    );
    assert_eq!(
        resolve_state_dir(None, None, None, Some(p("/h"))),
        p("/h/.local/state/fitsync")
    );
}

#[test]
fn test_queue_path_and_node_id() {
    let dir = PathBuf::from("/var/state/fitsync");
    assert_eq!(queue_path(&dir), dir.join("queue.jsonl"));
    assert_eq!(node_id(&dir), node_id(&dir));
    assert_ne!(node_id(&dir), node_id(&PathBuf::from("/other")));
}

#[test]
fn test_node_id_is_sha256_prefix_of_path() {
    // First four bytes of SHA-256("/var/state/fitsync"), big-endian.
    assert_eq!(node_id(&PathBuf::from("/var/state/fitsync")), 2_488_982_561);
}

#[test]
fn test_zero_intervals_are_clamped() {
    let sync = SyncSettings {
        interval_secs: 0,
        probe_interval_secs: 0,
        max_server_error_attempts: 0,
    };
    assert_eq!(sync.interval(), Duration::from_secs(1));
    assert_eq!(sync.probe_interval(), Duration::from_secs(1));
}
