// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync for workout mutations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  enqueue   ┌──────────────┐
//! │   commands   │───────────►│ MutationQueue│  (durable JSONL)
//! └──────────────┘            └──────┬───────┘
//!                                    │ drain
//!                             ┌──────▼───────┐   publish   ┌──────────┐
//!                             │  SyncEngine  │────────────►│ StateBus │
//!                             └──────┬───────┘             └──────────┘
//!                                    │ replay
//!                             ┌──────▼───────┐
//!                             │  WorkoutApi  │
//!                             └──────┬───────┘
//!                                    │
//!                   ┌────────────────▼────────────────┐
//!                   │ OfflineGuard ─► Traced ─► Client │ ◄── ConnectivityMonitor
//!                   └────────────────┬────────────────┘
//!                                    │ frames
//!                             ┌──────▼───────┐
//!                             │  Transport   │  (WebSocket)
//!                             └──────────────┘
//! ```
//!
//! [`SyncRunner`] schedules drains on reconnect, on an interval and on demand.

mod api;
mod bus;
mod client;
mod connectivity;
mod engine;
mod middleware;
mod queue;
mod runner;
mod transport;

pub use api::{
    ApiClient, ApiError, ApiFuture, ApiResult, RemoteError, RemoteFuture, RemoteWorkoutApi,
    WorkoutApi,
};
pub use bus::{DroppedMutation, StateBus, Subscription, SyncState, Topic};
pub use client::{ClientConfig, WorkoutClient};
pub use connectivity::{probe_once, probe_target, spawn_probe, ConnectivityMonitor, LiveChannel};
pub use engine::{DrainOutcome, DrainReport, EngineConfig, InitOutcome, SyncEngine};
pub use middleware::{OfflineGuard, Traced};
pub use queue::{JsonlStore, MutationQueue, QueueError, QueueResult, QueueStore};
pub use runner::SyncRunner;
pub use transport::{Transport, TransportError, TransportResult, WebSocketTransport};

/// The client stack used by the CLI.
pub type RemoteApi = WorkoutApi<OfflineGuard<Traced<std::sync::Arc<WorkoutClient>>>>;

#[cfg(test)]
mod test_helpers;
