// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable mutation queue.
//!
//! Mutations recorded while offline are persisted to a JSONL file before
//! `enqueue` returns, and stay there until the sync engine removes them after
//! a confirmed replay (or an unrecoverable rejection). Entries are kept in
//! replay order: `created_at` ascending, ties broken by the stamp id.
//!
//! The on-disk file is guarded by an exclusive advisory lock so that two
//! processes sharing a state directory cannot interleave rewrites.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use tracing::{debug, warn};

use fit_core::{
    jsonl, ClockSource, MutationId, QueuedMutation, QueuedMutationInput, StampClock, SystemClock,
};

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading or writing the queue file failed.
    #[error("storage error: {0}")]
    Storage(#[from] fit_core::Error),

    /// Another process holds the queue.
    #[error("queue {0} is locked by another process\n  hint: stop the running 'fitsync watch' or wait for it to finish")]
    Locked(PathBuf),

    /// The mutation payload failed validation and was not stored.
    #[error("invalid mutation: {0}")]
    Invalid(String),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Backing storage for a [`MutationQueue`].
///
/// `append` and `replace_all` must be durable when they return `Ok`.
pub trait QueueStore: Send {
    /// Load every stored mutation, in any order.
    fn load(&self) -> QueueResult<Vec<QueuedMutation>>;

    /// Durably add one mutation.
    fn append(&mut self, mutation: &QueuedMutation) -> QueueResult<()>;

    /// Durably replace the stored set.
    fn replace_all(&mut self, mutations: &[QueuedMutation]) -> QueueResult<()>;
}

/// JSONL file store with fsync on every write.
pub struct JsonlStore {
    path: PathBuf,
    /// Held for the lifetime of the store; released on drop.
    _lock: File,
}

impl JsonlStore {
    /// Open (or create) the store at `path`, taking an exclusive lock on
    /// `<path>.lock`.
    pub fn open(path: &Path) -> QueueResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock_path = path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        lock.try_lock_exclusive()
            .map_err(|_| QueueError::Locked(path.to_path_buf()))?;

        OpenOptions::new().create(true).append(true).open(path)?;
        if jsonl::repair_tail(path)? {
            warn!(path = %path.display(), "repaired torn last line in queue file");
        }

        Ok(JsonlStore {
            path: path.to_path_buf(),
            _lock: lock,
        })
    }

    /// Path of the queue file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QueueStore for JsonlStore {
    fn load(&self) -> QueueResult<Vec<QueuedMutation>> {
        Ok(jsonl::read_all(&self.path)?)
    }

    fn append(&mut self, mutation: &QueuedMutation) -> QueueResult<()> {
        Ok(jsonl::append(&self.path, mutation)?)
    }

    fn replace_all(&mut self, mutations: &[QueuedMutation]) -> QueueResult<()> {
        Ok(jsonl::write_all(&self.path, mutations)?)
    }
}

/// Ordered, durable queue of pending mutations.
///
/// The in-memory list mirrors the store and is only updated after the store
/// write succeeds, so a failed write leaves both unchanged.
pub struct MutationQueue<S: QueueStore = JsonlStore> {
    store: S,
    pending: Vec<QueuedMutation>,
    clock: StampClock<Arc<dyn ClockSource>>,
}

impl MutationQueue<JsonlStore> {
    /// Open the JSONL-backed queue at `path` using the system clock.
    pub fn open(path: &Path, node_id: u32) -> QueueResult<Self> {
        let store = JsonlStore::open(path)?;
        Self::with_store(store, node_id, Arc::new(SystemClock))
    }
}

impl<S: QueueStore> MutationQueue<S> {
    /// Build a queue over an arbitrary store and clock.
    pub fn with_store(store: S, node_id: u32, clock: Arc<dyn ClockSource>) -> QueueResult<Self> {
        let mut pending = store.load()?;
        pending.sort_by_key(QueuedMutation::replay_key);

        let clock = StampClock::with_clock(clock, node_id);
        if let Some(latest) = pending.iter().map(|m| m.id).max() {
            clock.observe(&latest);
        }

        debug!(count = pending.len(), "loaded mutation queue");
        Ok(MutationQueue {
            store,
            pending,
            clock,
        })
    }

    /// Durably append a mutation and return the stored entry.
    ///
    /// The id and `created_at` are assigned here; `attempts` starts at zero.
    pub fn enqueue(&mut self, input: QueuedMutationInput) -> QueueResult<QueuedMutation> {
        if let QueuedMutationInput::CreateWorkout { fields } = &input {
            fields
                .validate()
                .map_err(|e| QueueError::Invalid(e.to_string()))?;
        }
        if input.workout_id().trim().is_empty() {
            return Err(QueueError::Invalid("workout id must not be empty".into()));
        }

        let id = self.clock.next();
        let mutation = QueuedMutation::new(id, id.wall_time(), input);
        self.store.append(&mutation)?;

        let key = mutation.replay_key();
        let at = self.pending.partition_point(|m| m.replay_key() <= key);
        self.pending.insert(at, mutation.clone());

        debug!(id = %mutation.id, kind = %mutation.kind(), "enqueued mutation");
        Ok(mutation)
    }

    /// Snapshot of all pending mutations in replay order.
    pub fn list(&self) -> Vec<QueuedMutation> {
        self.pending.clone()
    }

    /// Look up a pending mutation.
    pub fn get(&self, id: &MutationId) -> Option<&QueuedMutation> {
        self.pending.iter().find(|m| m.id == *id)
    }

    /// Durably remove a mutation. Removing an absent id is a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn remove(&mut self, id: &MutationId) -> QueueResult<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let remaining: Vec<QueuedMutation> = self
            .pending
            .iter()
            .filter(|m| m.id != *id)
            .cloned()
            .collect();
        self.store.replace_all(&remaining)?;
        self.pending = remaining;

        debug!(%id, "removed mutation");
        Ok(true)
    }

    /// Durably bump the failed-attempt counter of a mutation after a
    /// transient failure. This ends any run of server faults.
    ///
    /// Returns the new count, or `None` if the id is not queued.
    pub fn record_attempt(&mut self, id: &MutationId) -> QueueResult<Option<u32>> {
        self.update(id, |m| {
            m.attempts = m.attempts.saturating_add(1);
            m.server_faults = 0;
            m.attempts
        })
    }

    /// Durably record a server fault (5xx) as a failed attempt.
    ///
    /// Returns the number of consecutive server faults, or `None` if the id
    /// is not queued.
    pub fn record_server_fault(&mut self, id: &MutationId) -> QueueResult<Option<u32>> {
        self.update(id, |m| {
            m.attempts = m.attempts.saturating_add(1);
            m.server_faults = m.server_faults.saturating_add(1);
            m.server_faults
        })
    }

    fn update(
        &mut self,
        id: &MutationId,
        apply: impl FnOnce(&mut QueuedMutation) -> u32,
    ) -> QueueResult<Option<u32>> {
        let Some(index) = self.pending.iter().position(|m| m.id == *id) else {
            return Ok(None);
        };

        let mut updated = self.pending.clone();
        let value = apply(&mut updated[index]);
        self.store.replace_all(&updated)?;
        self.pending = updated;

        Ok(Some(value))
    }

    /// Number of pending mutations.
    pub fn count(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
