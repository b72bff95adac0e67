// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod delete;
pub mod log;
pub mod pending;
pub mod status;
pub mod sync;
pub mod watch;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fit_core::Identity;
use tracing::debug;

use crate::config::{self as cfg, Config, RemoteConfig};
use crate::error::Result;
use crate::sync::{
    probe_once, probe_target, ClientConfig, ConnectivityMonitor, DroppedMutation, EngineConfig,
    MutationQueue, OfflineGuard, RemoteApi, StateBus, SyncEngine, Traced, WorkoutApi,
    WorkoutClient,
};

/// Resolved state directory and configuration for one invocation.
pub(crate) struct Context {
    pub state_dir: PathBuf,
    pub config: Config,
}

impl Context {
    pub fn load(state_dir: Option<&Path>) -> Result<Self> {
        let state_dir = cfg::state_dir(state_dir);
        let config = Config::load(&state_dir)?;
        debug!(state_dir = %state_dir.display(), "loaded config");
        Ok(Context { state_dir, config })
    }

    pub fn queue_path(&self) -> PathBuf {
        cfg::queue_path(&self.state_dir)
    }

    /// Open the local queue without any remote wiring.
    pub fn open_queue(&self) -> Result<MutationQueue> {
        Ok(MutationQueue::open(
            &self.queue_path(),
            cfg::node_id(&self.state_dir),
        )?)
    }

    /// Build the full sync stack. Requires a remote and an identity.
    pub fn connect(&self) -> Result<Session> {
        let remote = self.config.require_remote()?.clone();
        let identity = self.config.require_identity()?;
        let queue = self.open_queue()?;

        let client = Arc::new(WorkoutClient::new(ClientConfig {
            url: remote.url.clone(),
            connect_timeout: remote.connect_timeout(),
            reply_timeout: remote.reply_timeout(),
        }));
        // Offline until the first probe says otherwise.
        let monitor = Arc::new(ConnectivityMonitor::new(false));
        monitor.register_channel(client.clone());

        let api: RemoteApi =
            WorkoutApi::new(OfflineGuard::new(Traced::new(client), Arc::clone(&monitor)));
        let engine = SyncEngine::new(
            api,
            queue,
            StateBus::new(),
            EngineConfig {
                max_server_error_attempts: self.config.sync.max_server_error_attempts,
            },
        );

        Ok(Session {
            engine: Arc::new(engine),
            monitor,
            remote,
            identity,
        })
    }
}

/// A wired sync engine for commands that talk to the remote.
pub(crate) struct Session {
    pub engine: Arc<SyncEngine<RemoteApi>>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub remote: RemoteConfig,
    pub identity: Identity,
}

/// What a one-shot sync accomplished.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SyncSummary {
    pub online: bool,
    pub replayed: usize,
    pub dropped: Vec<DroppedMutation>,
    pub remaining: usize,
}

impl SyncSummary {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for d in &self.dropped {
            out.push_str(&watch::format_dropped(d));
            out.push('\n');
        }
        if !self.online {
            out.push_str(&format!(
                "offline: {} pending, will sync when the remote is reachable",
                self.remaining
            ));
        } else if self.remaining == 0 {
            out.push_str(&format!("synced {}, nothing pending", self.replayed));
        } else {
            out.push_str(&format!(
                "synced {}, {} still pending",
                self.replayed, self.remaining
            ));
        }
        out
    }
}

impl Session {
    /// `host:port` to probe for reachability.
    pub fn probe_target(&self) -> Option<String> {
        probe_target(&self.remote.url)
    }

    /// Probe the remote once and record the result on the monitor.
    pub async fn probe(&self) -> bool {
        let reachable = match self.probe_target() {
            Some(target) => probe_once(&target, self.remote.connect_timeout()).await,
            None => false,
        };
        self.monitor.set_online(reachable);
        reachable
    }

    /// Probe, then drain once if the remote is reachable.
    pub async fn sync_now(&self) -> SyncSummary {
        let before = self.engine.pending_count();
        let dropped: Arc<Mutex<Vec<DroppedMutation>>> = Arc::default();
        let sink = Arc::clone(&dropped);
        let _dropped = self.engine.on_mutation_dropped(move |d| {
            sink.lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(d.clone())
        });

        let online = self.probe().await;
        if online {
            self.engine.initialize(self.identity.clone()).await;
        }

        let remaining = self.engine.pending_count();
        let dropped = std::mem::take(&mut *dropped.lock().unwrap_or_else(|e| e.into_inner()));
        SyncSummary {
            online,
            replayed: before.saturating_sub(remaining + dropped.len()),
            dropped,
            remaining,
        }
    }
}

/// Run `future` to completion on a fresh tokio runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub(crate) mod testing;
