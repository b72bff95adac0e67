// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration lives in `config.toml` inside the state directory, next to
//! the mutation queue:
//!
//! ```toml
//! token = "..."            # optional, FITSYNC_TOKEN wins
//!
//! [remote]
//! url = "ws://127.0.0.1:7890"
//! connect_timeout_secs = 5
//! reply_timeout_secs = 10
//!
//! [sync]
//! interval_secs = 60
//! probe_interval_secs = 10
//! max_server_error_attempts = 5
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fit_core::Identity;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::env;
use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_FILE_NAME: &str = "queue.jsonl";
const STATE_DIR_NAME: &str = "fitsync";

/// Client configuration stored in `<state_dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Identity token. `FITSYNC_TOKEN` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Remote API (optional; without it the client only queues).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Remote API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL (`ws://` or `wss://`).
    pub url: String,
    /// Max time to wait for a connection in seconds (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Max time to wait for a reply in seconds (default: 10).
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            connect_timeout_secs: default_connect_timeout_secs(),
            reply_timeout_secs: default_reply_timeout_secs(),
        }
    }

    /// Validates that the URL is a WebSocket URL with a host.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        let rest = self
            .url
            .strip_prefix("ws://")
            .or_else(|| self.url.strip_prefix("wss://"));
        match rest {
            None => Some("must start with ws:// or wss://".to_string()),
            Some(rest) if rest.split('/').next().unwrap_or_default().is_empty() => {
                Some("missing host".to_string())
            }
            Some(_) => None,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_reply_timeout_secs() -> u64 {
    10
}

/// Background sync tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Safety-net drain interval in seconds (default: 60).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Reachability probe interval in seconds (default: 10).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    /// 5xx attempts before a mutation is dropped (default: 5, 0 = never).
    #[serde(default = "default_max_server_error_attempts")]
    pub max_server_error_attempts: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            interval_secs: default_interval_secs(),
            probe_interval_secs: default_probe_interval_secs(),
            max_server_error_attempts: default_max_server_error_attempts(),
        }
    }
}

impl SyncSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_probe_interval_secs() -> u64 {
    10
}

fn default_max_server_error_attempts() -> u32 {
    5
}

impl Config {
    /// Load `config.toml` from `state_dir`. A missing file yields defaults.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&content)?;
        if let Some(msg) = config.remote.as_ref().and_then(RemoteConfig::validate_url) {
            let url = config.remote.map(|r| r.url).unwrap_or_default();
            return Err(Error::InvalidRemoteUrl { url, reason: msg });
        }
        Ok(config)
    }

    /// Write `config.toml` into `state_dir`, creating the directory.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let content = toml::to_string_pretty(self)?;
        fs::write(state_dir.join(CONFIG_FILE_NAME), content)?;
        Ok(())
    }

    /// The identity to sync as, from `FITSYNC_TOKEN` or the `token` key.
    pub fn identity(&self) -> Result<Option<Identity>> {
        self.identity_with(env::token())
    }

    fn identity_with(&self, env_token: Option<String>) -> Result<Option<Identity>> {
        match env_token.or_else(|| self.token.clone()) {
            Some(token) if !token.trim().is_empty() => Ok(Some(Identity::new(token)?)),
            _ => Ok(None),
        }
    }

    /// Like [`Config::identity`], but missing identity is an error.
    pub fn require_identity(&self) -> Result<Identity> {
        self.identity()?.ok_or(Error::NoIdentity)
    }

    pub fn require_remote(&self) -> Result<&RemoteConfig> {
        self.remote.as_ref().ok_or(Error::NoRemote)
    }
}

/// Resolve the state directory: explicit override, then `FITSYNC_STATE_DIR`,
/// then `$XDG_STATE_HOME/fitsync`, then `~/.local/state/fitsync`.
pub fn state_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_state_dir(
        explicit.map(Path::to_path_buf),
        env::state_dir(),
        env::xdg_state_home(),
        dirs::home_dir(),
    )
}

fn resolve_state_dir(
    explicit: Option<PathBuf>,
    env_dir: Option<PathBuf>,
    xdg_state: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    explicit
        .or(env_dir)
        .or_else(|| xdg_state.map(|xdg| xdg.join(STATE_DIR_NAME)))
        .unwrap_or_else(|| {
            home.unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("state")
                .join(STATE_DIR_NAME)
        })
}

/// Path of the mutation queue inside `state_dir`.
pub fn queue_path(state_dir: &Path) -> PathBuf {
    state_dir.join(QUEUE_FILE_NAME)
}

/// Node id for mutation stamps: the first four bytes of SHA-256 over the
/// state directory path, so it survives restarts and toolchain upgrades.
pub fn node_id(state_dir: &Path) -> u32 {
    let digest = Sha256::digest(state_dir.as_os_str().as_encoded_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
