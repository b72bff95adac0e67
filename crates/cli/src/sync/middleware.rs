// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! [`ApiClient`] middleware.
//!
//! The production stack is `OfflineGuard<Traced<WorkoutClient>>`: the guard
//! runs first so offline calls never reach the transport or the logs.

use std::sync::Arc;
use std::time::Instant;

use fit_core::protocol::{ClientMessage, ServerMessage};
use tracing::{debug, warn};

use super::api::{ApiClient, ApiError, ApiFuture};
use super::connectivity::ConnectivityMonitor;

/// Fails every call with [`ApiError::NetworkUnavailable`] while offline,
/// without invoking the inner client.
pub struct OfflineGuard<C> {
    inner: C,
    monitor: Arc<ConnectivityMonitor>,
}

impl<C: ApiClient> OfflineGuard<C> {
    pub fn new(inner: C, monitor: Arc<ConnectivityMonitor>) -> Self {
        OfflineGuard { inner, monitor }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: ApiClient> ApiClient for OfflineGuard<C> {
    fn call(&self, request: ClientMessage) -> ApiFuture<'_, ServerMessage> {
        if !self.monitor.is_online() {
            return Box::pin(std::future::ready(Err(ApiError::NetworkUnavailable)));
        }
        self.inner.call(request)
    }
}

/// Logs each call with its outcome and latency.
pub struct Traced<C> {
    inner: C,
}

impl<C: ApiClient> Traced<C> {
    pub fn new(inner: C) -> Self {
        Traced { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: ApiClient> ApiClient for Traced<C> {
    fn call(&self, request: ClientMessage) -> ApiFuture<'_, ServerMessage> {
        Box::pin(async move {
            let name = request.name();
            let started = Instant::now();
            let result = self.inner.call(request).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => debug!(request = name, elapsed_ms, "api call ok"),
                Err(e) => warn!(request = name, elapsed_ms, error = %e, "api call failed"),
            }
            result
        })
    }
}
