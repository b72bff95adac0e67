// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: replays queued mutations against the remote API.
//!
//! A drain walks the queue in replay order. Each mutation is removed only
//! after the server confirms it, so a crash at any point leaves it queued and
//! it is replayed again later (the remote operations are idempotent). A
//! transient failure stops the drain with the rest of the queue intact; a
//! permanent rejection drops just that mutation and the drain moves on.
//!
//! At most one drain runs at a time. A drain requested while another is in
//! progress returns immediately with [`DrainOutcome::Coalesced`]; the running
//! drain re-reads the queue after each pass, so it also picks up mutations
//! enqueued while it was replaying.
//!
//! The identity is checked before every replay. When it changes or is
//! cleared mid-drain, the drain ends with [`DrainOutcome::Superseded`] and
//! nothing further goes out under the old credential.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use fit_core::{
    Identity, MutationId, MutationPayload, QueuedMutation, QueuedMutationInput, WorkoutFields,
};
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use super::api::{RemoteError, RemoteWorkoutApi};
use super::bus::{DroppedMutation, StateBus, Subscription, SyncState};
use super::queue::{JsonlStore, MutationQueue, QueueResult, QueueStore};

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Consecutive server faults (5xx) a mutation may hit before it is dropped.
    /// Zero retries forever.
    pub max_server_error_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_server_error_attempts: 5,
        }
    }
}

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainOutcome {
    /// The queue was emptied (apart from entries whose removal failed).
    Completed,
    /// A transient failure stopped the drain.
    Interrupted,
    /// Another drain was already running.
    Coalesced,
    /// No identity; nothing was attempted.
    NotInitialized,
    /// The identity changed or was cleared mid-drain.
    Superseded,
}

/// Summary of one drain call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub outcome: DrainOutcome,
    /// Mutations confirmed by the server.
    pub replayed: usize,
    /// Mutations dropped as permanently rejected.
    pub dropped: usize,
    /// Mutations still queued when the drain ended.
    pub remaining: usize,
}

impl DrainReport {
    fn new(outcome: DrainOutcome, remaining: usize) -> Self {
        DrainReport {
            outcome,
            replayed: 0,
            dropped: 0,
            remaining,
        }
    }
}

/// Result of [`SyncEngine::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// First identity; a drain was run.
    Initialized,
    /// A different identity replaced the previous one; a drain was run.
    Reinitialized,
    /// Same identity as before; nothing happened.
    Unchanged,
}

/// Clears the running flag when a drain ends, however it ends, and wakes
/// anyone waiting for it.
struct DrainGuard<'a> {
    running: &'a AtomicBool,
    idle: &'a Notify,
}

impl<'a> DrainGuard<'a> {
    fn acquire(running: &'a AtomicBool, idle: &'a Notify) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard { running, idle })
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.idle.notify_waiters();
    }
}

enum Step {
    Replayed,
    Dropped,
    Stop,
}

/// Replays queued mutations and publishes sync state.
pub struct SyncEngine<A: RemoteWorkoutApi, S: QueueStore = JsonlStore> {
    api: A,
    queue: Mutex<MutationQueue<S>>,
    bus: StateBus,
    identity: Mutex<Option<Identity>>,
    running: AtomicBool,
    idle: Notify,
    config: EngineConfig,
}

impl<A: RemoteWorkoutApi, S: QueueStore> SyncEngine<A, S> {
    /// Build an engine over an opened queue. Publishes the initial count.
    pub fn new(api: A, queue: MutationQueue<S>, bus: StateBus, config: EngineConfig) -> Self {
        bus.set_pending_count(queue.count());
        SyncEngine {
            api,
            queue: Mutex::new(queue),
            bus,
            identity: Mutex::new(None),
            running: AtomicBool::new(false),
            idle: Notify::new(),
            config,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn bus(&self) -> &StateBus {
        &self.bus
    }

    /// The identity replays run as, if initialized.
    pub fn identity(&self) -> Option<Identity> {
        self.identity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Bind the engine to an identity and drain.
    ///
    /// Re-initializing with the same identity does nothing. If a drain
    /// started under the previous identity is still running, this waits for
    /// it to stand down and then drains as the new identity.
    pub async fn initialize(&self, identity: Identity) -> InitOutcome {
        let outcome = {
            let mut current = self.identity.lock().unwrap_or_else(|e| e.into_inner());
            let outcome = match current.as_ref() {
                Some(existing) if *existing == identity => return InitOutcome::Unchanged,
                Some(_) => InitOutcome::Reinitialized,
                None => InitOutcome::Initialized,
            };
            info!(identity = %identity, "sync engine initialized");
            *current = Some(identity);
            outcome
        };

        let mut report = self.drain().await;
        if report.outcome == DrainOutcome::Coalesced {
            // Any drain that starts after this point reads the new identity,
            // so one retry is enough.
            self.drain_finished().await;
            report = self.drain().await;
        }
        debug!(?report, "initial drain finished");
        outcome
    }

    /// Resolves once no drain is running.
    async fn drain_finished(&self) {
        let notified = self.idle.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.running.load(Ordering::Acquire) {
            notified.await;
        }
    }

    /// Forget the identity. Later drains do nothing until re-initialized.
    pub fn shutdown(&self) {
        let previous = self
            .identity
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if previous.is_some() {
            info!("sync engine shut down");
        }
    }

    /// Queue a workout creation.
    pub fn enqueue_workout_create(&self, fields: WorkoutFields) -> QueueResult<QueuedMutation> {
        self.enqueue(MutationPayload::create(fields))
    }

    /// Queue a workout deletion.
    pub fn enqueue_workout_delete(&self, workout_id: &str) -> QueueResult<QueuedMutation> {
        self.enqueue(MutationPayload::delete(workout_id))
    }

    fn enqueue(&self, input: QueuedMutationInput) -> QueueResult<QueuedMutation> {
        let mutation = self.queue().enqueue(input)?;
        self.publish_count();
        Ok(mutation)
    }

    /// Number of queued mutations.
    pub fn pending_count(&self) -> usize {
        self.queue().count()
    }

    /// Queued mutations in replay order.
    pub fn pending(&self) -> Vec<QueuedMutation> {
        self.queue().list()
    }

    /// Current observable state.
    pub fn state(&self) -> SyncState {
        SyncState {
            pending_count: self.pending_count(),
            is_syncing: self.running.load(Ordering::Acquire),
        }
    }

    pub fn on_pending_count_change(
        &self,
        listener: impl Fn(usize) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.on_pending_count_change(listener)
    }

    pub fn on_syncing_change(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> Subscription {
        self.bus.on_syncing_change(listener)
    }

    pub fn on_mutation_dropped(
        &self,
        listener: impl Fn(&DroppedMutation) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.on_mutation_dropped(listener)
    }

    /// Replay queued mutations until the queue is empty or a transient
    /// failure stops the drain.
    pub async fn drain(&self) -> DrainReport {
        let Some(_guard) = DrainGuard::acquire(&self.running, &self.idle) else {
            debug!("drain already running");
            return DrainReport::new(DrainOutcome::Coalesced, self.pending_count());
        };
        let Some(identity) = self.identity() else {
            debug!("drain skipped: not initialized");
            return DrainReport::new(DrainOutcome::NotInitialized, self.pending_count());
        };

        self.bus.set_syncing(true);
        let mut report = DrainReport::new(DrainOutcome::Completed, 0);
        // Settled with the server but still on disk because removal failed.
        let mut settled: HashSet<MutationId> = HashSet::new();

        'drain: loop {
            let listed = self.queue().list();
            let mut batch = Vec::with_capacity(listed.len());
            for mutation in listed {
                if settled.contains(&mutation.id) {
                    self.settle(&mutation, &mut settled);
                } else {
                    batch.push(mutation);
                }
            }
            if batch.is_empty() {
                break;
            }

            for mutation in batch {
                if self.identity().as_ref() != Some(&identity) {
                    info!("identity changed mid-drain, standing down");
                    report.outcome = DrainOutcome::Superseded;
                    break 'drain;
                }
                match self.replay_one(&identity, &mutation, &mut settled).await {
                    Step::Replayed => report.replayed += 1,
                    Step::Dropped => report.dropped += 1,
                    Step::Stop => {
                        report.outcome = DrainOutcome::Interrupted;
                        break 'drain;
                    }
                }
            }
        }

        report.remaining = self.pending_count();
        self.publish_count();
        self.bus.set_syncing(false);
        info!(
            outcome = ?report.outcome,
            replayed = report.replayed,
            dropped = report.dropped,
            remaining = report.remaining,
            "drain finished"
        );
        report
    }

    async fn replay_one(
        &self,
        identity: &Identity,
        mutation: &QueuedMutation,
        settled: &mut HashSet<MutationId>,
    ) -> Step {
        let result = match &mutation.payload {
            MutationPayload::CreateWorkout { fields } => {
                self.api.create_workout(identity, fields).await.map(|_| ())
            }
            MutationPayload::DeleteWorkout { client_workout_id } => {
                self.api.delete_workout(identity, client_workout_id).await
            }
        };

        match result {
            Ok(()) => {
                debug!(id = %mutation.id, kind = %mutation.kind(), "replayed mutation");
                self.settle(mutation, settled);
                Step::Replayed
            }
            Err(RemoteError::Rejected { code, reason }) => {
                self.drop_mutation(mutation, format!("rejected ({code}): {reason}"), settled);
                Step::Dropped
            }
            Err(RemoteError::ServerFault { code, reason }) => {
                let faults = self.record_server_fault(mutation);
                let limit = self.config.max_server_error_attempts;
                if limit > 0 && faults >= limit {
                    self.drop_mutation(
                        mutation,
                        format!("server fault ({code}) after {faults} attempts: {reason}"),
                        settled,
                    );
                    Step::Dropped
                } else {
                    warn!(id = %mutation.id, code, faults, %reason, "server fault, will retry");
                    Step::Stop
                }
            }
            Err(RemoteError::Transient(reason)) => {
                let attempts = self.record_attempt(mutation);
                debug!(id = %mutation.id, attempts, %reason, "transient failure, stopping drain");
                Step::Stop
            }
        }
    }

    fn drop_mutation(
        &self,
        mutation: &QueuedMutation,
        reason: String,
        settled: &mut HashSet<MutationId>,
    ) {
        warn!(
            id = %mutation.id,
            kind = %mutation.kind(),
            workout = mutation.payload.workout_id(),
            %reason,
            "dropping mutation"
        );
        self.settle(mutation, settled);
        self.bus.report_dropped(DroppedMutation {
            id: mutation.id,
            kind: mutation.kind(),
            workout_id: mutation.payload.workout_id().to_string(),
            reason,
        });
    }

    /// Remove a mutation the server has settled. On failure it is remembered
    /// so this drain does not replay it again.
    fn settle(&self, mutation: &QueuedMutation, settled: &mut HashSet<MutationId>) {
        let removed = self.queue().remove(&mutation.id);
        match removed {
            Ok(_) => {
                settled.remove(&mutation.id);
            }
            Err(e) => {
                warn!(id = %mutation.id, error = %e, "failed to remove settled mutation");
                settled.insert(mutation.id);
            }
        }
        self.publish_count();
    }

    fn record_attempt(&self, mutation: &QueuedMutation) -> u32 {
        match self.queue().record_attempt(&mutation.id) {
            Ok(Some(attempts)) => attempts,
            Ok(None) => mutation.attempts.saturating_add(1),
            Err(e) => {
                warn!(id = %mutation.id, error = %e, "failed to record attempt");
                mutation.attempts.saturating_add(1)
            }
        }
    }

    fn record_server_fault(&self, mutation: &QueuedMutation) -> u32 {
        match self.queue().record_server_fault(&mutation.id) {
            Ok(Some(faults)) => faults,
            Ok(None) => mutation.server_faults.saturating_add(1),
            Err(e) => {
                warn!(id = %mutation.id, error = %e, "failed to record server fault");
                mutation.server_faults.saturating_add(1)
            }
        }
    }

    /// Publish the queue length. Read under the bus's emit lock so that
    /// concurrent publishers cannot leave a stale count behind.
    fn publish_count(&self) {
        self.bus.refresh_pending_count(|| self.pending_count());
    }

    fn queue(&self) -> MutexGuard<'_, MutationQueue<S>> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}
