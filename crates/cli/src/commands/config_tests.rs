// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_set_remote_on_fresh_config() {
    let config = set_remote(Config::default(), "ws://127.0.0.1:7890").unwrap();
    let remote = config.remote.unwrap();
    assert_eq!(remote.url, "ws://127.0.0.1:7890");
    assert_eq!(remote.connect_timeout_secs, 5);
}

#[test]
fn test_set_remote_keeps_timeouts() {
    let mut config = Config::default();
    let mut remote = RemoteConfig::new("ws://old:1");
    remote.reply_timeout_secs = 42;
    config.remote = Some(remote);

    let config = set_remote(config, "wss://new.example.com").unwrap();

    let remote = config.remote.unwrap();
    assert_eq!(remote.url, "wss://new.example.com");
    assert_eq!(remote.reply_timeout_secs, 42);
}

#[test]
fn test_set_remote_rejects_http() {
    assert!(matches!(
        set_remote(Config::default(), "http://example.com"),
        Err(Error::InvalidRemoteUrl { .. })
    ));
}

#[test]
fn test_render_without_token_or_remote() {
    let text = render(&Config::default()).unwrap();
    assert!(text.contains("[sync]"));
    assert!(text.contains("interval_secs = 60"));
}
