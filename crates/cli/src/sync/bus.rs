// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Observable sync state.
//!
//! The [`StateBus`] publishes three topics: the pending mutation count, the
//! syncing flag, and dropped mutations. Values are published only when they
//! change, and listeners on a topic see them in publish order.
//!
//! Listeners run on the publishing thread and must not publish to the bus
//! themselves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use fit_core::{MutationId, MutationKind};
use serde::Serialize;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct TopicInner<T> {
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_id: AtomicU64,
    dispatch: Mutex<()>,
}

/// A single stream of values with any number of listeners.
pub struct Topic<T> {
    inner: Arc<TopicInner<T>>,
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Topic {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Topic<T> {
    fn default() -> Self {
        Topic {
            inner: Arc::new(TopicInner {
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                dispatch: Mutex::new(()),
            }),
        }
    }
}

impl<T: 'static> Topic<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every subsequently published value.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));

        let weak: Weak<TopicInner<T>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .listeners
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Deliver `value` to the current listeners.
    ///
    /// Listeners added or removed during delivery take effect from the next
    /// publish.
    pub fn publish(&self, value: &T) {
        let _dispatch = self.inner.dispatch.lock().unwrap_or_else(|e| e.into_inner());
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Handle returned by `subscribe`. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Stop receiving values. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        let cancel = self.cancel.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// A mutation the engine gave up on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedMutation {
    pub id: MutationId,
    pub kind: MutationKind,
    pub workout_id: String,
    pub reason: String,
}

/// Snapshot of the observable sync state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncState {
    pub pending_count: usize,
    pub is_syncing: bool,
}

/// Publishes sync state changes to UI observers.
#[derive(Clone, Default)]
pub struct StateBus {
    pending: Topic<usize>,
    syncing: Topic<bool>,
    dropped: Topic<DroppedMutation>,
    state: Arc<Mutex<SyncState>>,
    emit: Arc<Mutex<()>>,
}

impl StateBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with each new pending count.
    pub fn on_pending_count_change(
        &self,
        listener: impl Fn(usize) + Send + Sync + 'static,
    ) -> Subscription {
        self.pending.subscribe(move |n| listener(*n))
    }

    /// Called with each new syncing flag.
    pub fn on_syncing_change(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> Subscription {
        self.syncing.subscribe(move |b| listener(*b))
    }

    /// Called for each mutation dropped during a drain.
    pub fn on_mutation_dropped(
        &self,
        listener: impl Fn(&DroppedMutation) + Send + Sync + 'static,
    ) -> Subscription {
        self.dropped.subscribe(listener)
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set_pending_count(&self, count: usize) {
        self.refresh_pending_count(|| count);
    }

    /// Publish the count returned by `read`, which runs under the emit lock.
    pub(crate) fn refresh_pending_count(&self, read: impl FnOnce() -> usize) {
        let _emit = self.emit.lock().unwrap_or_else(|e| e.into_inner());
        let count = read();
        if self.update(|s| std::mem::replace(&mut s.pending_count, count) != count) {
            self.pending.publish(&count);
        }
    }

    pub(crate) fn set_syncing(&self, syncing: bool) {
        let _emit = self.emit.lock().unwrap_or_else(|e| e.into_inner());
        if self.update(|s| std::mem::replace(&mut s.is_syncing, syncing) != syncing) {
            self.syncing.publish(&syncing);
        }
    }

    pub(crate) fn report_dropped(&self, dropped: DroppedMutation) {
        let _emit = self.emit.lock().unwrap_or_else(|e| e.into_inner());
        self.dropped.publish(&dropped);
    }

    fn update(&self, f: impl FnOnce(&mut SyncState) -> bool) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }
}
