// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitor.
//!
//! Tracks whether the device is online and tells interested parties when
//! that changes. Going offline suspends every registered [`LiveChannel`]
//! (long-lived connections that would otherwise spin on reconnects); coming
//! back online resumes them.
//!
//! The online flag is driven externally via [`ConnectivityMonitor::set_online`],
//! typically by [`spawn_probe`], which periodically checks that the remote
//! endpoint accepts TCP connections.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A long-lived connection that should not be kept open while offline.
pub trait LiveChannel: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Release the connection and stop reconnecting.
    fn suspend(&self);

    /// Allow the connection to be re-established.
    fn resume(&self);
}

/// Shared online/offline state.
pub struct ConnectivityMonitor {
    online: watch::Sender<bool>,
    channels: Mutex<Vec<Arc<dyn LiveChannel>>>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the given initial state.
    pub fn new(initially_online: bool) -> Self {
        let (online, _) = watch::channel(initially_online);
        ConnectivityMonitor {
            online,
            channels: Mutex::new(Vec::new()),
        }
    }

    /// Current state.
    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Update the state.
    ///
    /// Returns `true` if this was a transition. Channels are suspended or
    /// resumed and subscribers woken only on transitions.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if !changed {
            return false;
        }

        info!(online, "connectivity changed");
        for channel in self.channels() {
            if online {
                debug!(channel = channel.name(), "resuming channel");
                channel.resume();
            } else {
                debug!(channel = channel.name(), "suspending channel");
                channel.suspend();
            }
        }
        true
    }

    /// Watch for state changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    /// Register a channel to be suspended while offline.
    ///
    /// A channel registered while offline is suspended immediately.
    pub fn register_channel(&self, channel: Arc<dyn LiveChannel>) {
        if !self.is_online() {
            channel.suspend();
        }
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(channel);
    }

    fn channels(&self) -> Vec<Arc<dyn LiveChannel>> {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Extract `host:port` from a `ws://` or `wss://` URL.
pub fn probe_target(url: &str) -> Option<String> {
    let (rest, default_port) = if let Some(rest) = url.strip_prefix("wss://") {
        (rest, 443)
    } else if let Some(rest) = url.strip_prefix("ws://") {
        (rest, 80)
    } else {
        return None;
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() {
        return None;
    }

    let has_port = match authority.rfind(':') {
        Some(i) => !authority.ends_with(']') && authority[i + 1..].parse::<u16>().is_ok(),
        None => false,
    };
    if has_port {
        Some(authority.to_string())
    } else {
        Some(format!("{authority}:{default_port}"))
    }
}

/// Whether `target` accepts a TCP connection within `timeout`.
pub async fn probe_once(target: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(target)).await,
        Ok(Ok(_))
    )
}

/// Periodically probe `target` and feed the result into `monitor`.
///
/// The first probe runs immediately. The task exits when `cancel` fires.
pub fn spawn_probe(
    monitor: Arc<ConnectivityMonitor>,
    target: String,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let reachable = probe_once(&target, timeout).await;
                    debug!(%target, reachable, "reachability probe");
                    monitor.set_online(reachable);
                }
            }
        }
    })
}
