// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request/reply client over a [`Transport`].
//!
//! Connects lazily on the first call and reuses the connection afterwards.
//! Each request gets a fresh correlation id; replies carrying other ids
//! (left over from an abandoned request) are skipped. One request is in
//! flight at a time.
//!
//! The client is a [`LiveChannel`]: while suspended every call fails with
//! [`ApiError::NetworkUnavailable`] and the connection is released.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use fit_core::protocol::{ClientMessage, ServerMessage};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::api::{ApiClient, ApiError, ApiFuture, ApiResult};
use super::connectivity::LiveChannel;
use super::transport::{Transport, TransportError, WebSocketTransport};

/// Configuration for [`WorkoutClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL of the remote server.
    pub url: String,
    /// How long to wait for a connection.
    pub connect_timeout: Duration,
    /// How long to wait for a reply once a request is sent.
    pub reply_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: "ws://localhost:7890".to_string(),
            connect_timeout: Duration::from_secs(5),
            reply_timeout: Duration::from_secs(10),
        }
    }
}

/// [`ApiClient`] over a single reusable connection.
pub struct WorkoutClient<T: Transport = WebSocketTransport> {
    config: ClientConfig,
    transport: Mutex<T>,
    suspended: AtomicBool,
    next_id: AtomicU64,
}

impl WorkoutClient<WebSocketTransport> {
    /// Client with the WebSocket transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, WebSocketTransport::new())
    }
}

impl<T: Transport> WorkoutClient<T> {
    /// Client with a custom transport (for testing).
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        WorkoutClient {
            config,
            transport: Mutex::new(transport),
            suspended: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Whether the client is suspended.
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    /// Whether a connection is currently open.
    ///
    /// Reports `false` while a request holds the connection.
    pub fn is_connected(&self) -> bool {
        self.transport
            .try_lock()
            .map(|t| t.is_connected())
            .unwrap_or(false)
    }

    async fn roundtrip(&self, request: ClientMessage) -> ApiResult<ServerMessage> {
        if self.is_suspended() {
            return Err(ApiError::NetworkUnavailable);
        }

        let mut transport = self.transport.lock().await;
        if !transport.is_connected() {
            transport
                .connect(&self.config.url, self.config.connect_timeout)
                .await?;
            info!(url = %self.config.url, "connected to remote");
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = request.with_correlation_id(id);
        let name = request.name();
        transport.send(request).await?;

        let reply = tokio::time::timeout(self.config.reply_timeout, async {
            loop {
                match transport.recv().await? {
                    Some(ServerMessage::Error { message }) => {
                        return Err(ApiError::Server(message));
                    }
                    Some(reply) if reply.correlation_id() == Some(id) => return Ok(reply),
                    Some(stale) => {
                        debug!(request = name, stale = ?stale.correlation_id(), "skipping stale reply");
                    }
                    None => return Err(TransportError::ConnectionClosed.into()),
                }
            }
        })
        .await;

        let reply = match reply {
            Ok(reply) => reply,
            Err(_) => {
                transport.reset();
                return Err(ApiError::Transport(format!(
                    "no reply to {name} within {:?}",
                    self.config.reply_timeout
                )));
            }
        };

        // Suspended while the request was in flight.
        if self.is_suspended() {
            transport.reset();
        }

        match reply? {
            ServerMessage::Rejected { code, reason, .. } => Err(ApiError::Rejected { code, reason }),
            reply => Ok(reply),
        }
    }
}

impl<T: Transport> ApiClient for WorkoutClient<T> {
    fn call(&self, request: ClientMessage) -> ApiFuture<'_, ServerMessage> {
        Box::pin(self.roundtrip(request))
    }
}

impl<T: Transport> LiveChannel for WorkoutClient<T> {
    fn name(&self) -> &str {
        "remote"
    }

    fn suspend(&self) {
        self.suspended.store(true, Ordering::SeqCst);
        if let Ok(mut transport) = self.transport.try_lock() {
            transport.reset();
        }
    }

    fn resume(&self) {
        self.suspended.store(false, Ordering::SeqCst);
    }
}
