// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background drain scheduling.
//!
//! The runner drains the engine when connectivity returns, on a fixed
//! interval while online, and whenever [`SyncRunner::trigger`] is called.
//! Drains requested while offline are skipped; they would only fail at the
//! offline guard.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::api::RemoteWorkoutApi;
use super::connectivity::ConnectivityMonitor;
use super::engine::SyncEngine;
use super::queue::QueueStore;

/// Handle to a running drain loop.
pub struct SyncRunner {
    trigger: Arc<Notify>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SyncRunner {
    /// Spawn the drain loop on the current tokio runtime.
    pub fn spawn<A, S>(
        engine: Arc<SyncEngine<A, S>>,
        monitor: Arc<ConnectivityMonitor>,
        interval: Duration,
    ) -> Self
    where
        A: RemoteWorkoutApi + 'static,
        S: QueueStore + 'static,
    {
        let trigger = Arc::new(Notify::new());
        let cancel = CancellationToken::new();
        // Subscribe before spawning so no transition is missed.
        let online = monitor.subscribe();
        let handle = tokio::spawn(run(
            engine,
            monitor,
            online,
            Arc::clone(&trigger),
            interval,
            cancel.clone(),
        ));
        SyncRunner {
            trigger,
            cancel,
            handle,
        }
    }

    /// Request a drain as soon as possible.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Token that stops the loop when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the loop and wait for an in-progress drain to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

async fn run<A, S>(
    engine: Arc<SyncEngine<A, S>>,
    monitor: Arc<ConnectivityMonitor>,
    mut online: watch::Receiver<bool>,
    trigger: Arc<Notify>,
    interval: Duration,
    cancel: CancellationToken,
) where
    A: RemoteWorkoutApi,
    S: QueueStore,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; skip it so startup does not
    // race the caller's own initial drain.
    ticker.tick().await;

    loop {
        let reason = tokio::select! {
            _ = cancel.cancelled() => break,
            changed = online.changed() => {
                if changed.is_err() {
                    break;
                }
                if !*online.borrow_and_update() {
                    continue;
                }
                "reconnected"
            }
            _ = ticker.tick() => "interval",
            _ = trigger.notified() => "requested",
        };

        if !monitor.is_online() {
            debug!(reason, "skipping drain while offline");
            continue;
        }

        let report = engine.drain().await;
        info!(reason, outcome = ?report.outcome, remaining = report.remaining, "background drain");
    }
    debug!("sync runner stopped");
}
