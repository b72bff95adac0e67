// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Wraps the workout store for shared access across connections.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use fit_core::{WorkoutFields, WorkoutRecord};

use crate::store::{Created, StoreResult, WorkoutStore};

/// Shared server state containing the workout store.
#[derive(Clone)]
pub struct ServerState {
    store: Arc<Mutex<WorkoutStore>>,
}

impl ServerState {
    /// Opens `workouts.db` in the given directory.
    pub fn new(data_dir: &Path) -> StoreResult<Self> {
        let store = WorkoutStore::open(&data_dir.join("workouts.db"))?;
        Ok(Self::with_store(store))
    }

    pub fn with_store(store: WorkoutStore) -> Self {
        ServerState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn create(&self, owner: &str, fields: &WorkoutFields) -> StoreResult<Created> {
        self.store.lock().await.create(owner, fields)
    }

    pub async fn delete(&self, owner: &str, client_workout_id: &str) -> StoreResult<bool> {
        self.store.lock().await.delete(owner, client_workout_id)
    }

    pub async fn list(&self, owner: &str) -> StoreResult<Vec<WorkoutRecord>> {
        self.store.lock().await.list(owner)
    }
}
