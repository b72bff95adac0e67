// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued mutations awaiting replay against the remote API.
//!
//! Every workout change made on the device is recorded as a mutation before
//! it is sent anywhere. A mutation carries everything needed to replay it,
//! so the queue can be drained long after the action that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stamp::Stamp;
use crate::workout::WorkoutFields;

/// Unique identifier for a queued mutation.
pub type MutationId = Stamp;

/// The kind of remote operation a mutation replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    CreateWorkout,
    DeleteWorkout,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::CreateWorkout => write!(f, "create"),
            MutationKind::DeleteWorkout => write!(f, "delete"),
        }
    }
}

/// Data needed to replay a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationPayload {
    /// Create the workout with these fields.
    CreateWorkout { fields: WorkoutFields },
    /// Delete the workout with this client id.
    DeleteWorkout { client_workout_id: String },
}

impl MutationPayload {
    /// Creates a create-workout payload.
    pub fn create(fields: WorkoutFields) -> Self {
        MutationPayload::CreateWorkout { fields }
    }

    /// Creates a delete-workout payload.
    pub fn delete(client_workout_id: impl Into<String>) -> Self {
        MutationPayload::DeleteWorkout { client_workout_id: client_workout_id.into() }
    }

    /// Returns the kind of operation this payload replays.
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationPayload::CreateWorkout { .. } => MutationKind::CreateWorkout,
            MutationPayload::DeleteWorkout { .. } => MutationKind::DeleteWorkout,
        }
    }

    /// Returns the client workout id this mutation affects.
    pub fn workout_id(&self) -> &str {
        match self {
            MutationPayload::CreateWorkout { fields } => &fields.client_workout_id,
            MutationPayload::DeleteWorkout { client_workout_id } => client_workout_id,
        }
    }
}

/// A mutation as handed to the queue, before it has an id.
pub type QueuedMutationInput = MutationPayload;

/// A pending offline operation, as persisted in the durable queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMutation {
    /// Locally generated id, stable across reloads.
    pub id: MutationId,
    /// When the mutation was enqueued. Replay follows this order.
    pub created_at: DateTime<Utc>,
    /// Failed replay attempts so far.
    #[serde(default)]
    pub attempts: u32,
    /// Consecutive server faults (5xx) among those attempts.
    #[serde(default)]
    pub server_faults: u32,
    pub payload: MutationPayload,
}

impl QueuedMutation {
    /// Creates a fresh mutation with no failed attempts.
    pub fn new(id: MutationId, created_at: DateTime<Utc>, payload: MutationPayload) -> Self {
        QueuedMutation { id, created_at, attempts: 0, server_faults: 0, payload }
    }

    /// Returns the kind of operation this mutation replays.
    pub fn kind(&self) -> MutationKind {
        self.payload.kind()
    }

    /// Sort key for replay: enqueue time, then id.
    pub fn replay_key(&self) -> (DateTime<Utc>, MutationId) {
        (self.created_at, self.id)
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
