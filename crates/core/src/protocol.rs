// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for the remote workout API.
//!
//! Every request carries a client-chosen `request_id` that the server echoes
//! in its reply, so the client can match replies to requests on a shared
//! connection. Rejections carry an HTTP-style status code that the client
//! uses to classify the failure as transient or permanent.

use serde::{Deserialize, Serialize};

use crate::workout::{WorkoutFields, WorkoutRecord};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a workout. Idempotent on the fields' client workout id.
    CreateWorkout {
        request_id: u64,
        token: String,
        fields: WorkoutFields,
    },

    /// Delete a workout by client workout id. Deleting an unknown id succeeds.
    DeleteWorkout {
        request_id: u64,
        token: String,
        workout_id: String,
    },

    /// List the caller's workouts.
    ListWorkouts { request_id: u64, token: String },

    /// Ping message for keepalive.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The workout is stored (or already was).
    Created { request_id: u64, record: WorkoutRecord },

    /// The workout is gone (or never existed).
    Deleted { request_id: u64 },

    /// Response to ListWorkouts.
    Workouts {
        request_id: u64,
        records: Vec<WorkoutRecord>,
    },

    /// The server refused the request.
    Rejected {
        request_id: u64,
        /// HTTP-style status code (422 invalid payload, 401 bad token, ...).
        code: u16,
        reason: String,
    },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// The server could not make sense of a frame.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a CreateWorkout message.
    pub fn create_workout(request_id: u64, token: impl Into<String>, fields: WorkoutFields) -> Self {
        ClientMessage::CreateWorkout { request_id, token: token.into(), fields }
    }

    /// Creates a DeleteWorkout message.
    pub fn delete_workout(
        request_id: u64,
        token: impl Into<String>,
        workout_id: impl Into<String>,
    ) -> Self {
        ClientMessage::DeleteWorkout {
            request_id,
            token: token.into(),
            workout_id: workout_id.into(),
        }
    }

    /// Creates a ListWorkouts message.
    pub fn list_workouts(request_id: u64, token: impl Into<String>) -> Self {
        ClientMessage::ListWorkouts { request_id, token: token.into() }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Returns the id the server will echo in its reply.
    pub fn correlation_id(&self) -> u64 {
        match self {
            ClientMessage::CreateWorkout { request_id, .. }
            | ClientMessage::DeleteWorkout { request_id, .. }
            | ClientMessage::ListWorkouts { request_id, .. } => *request_id,
            ClientMessage::Ping { id } => *id,
        }
    }

    /// Returns a copy of this message with a different correlation id.
    pub fn with_correlation_id(mut self, new_id: u64) -> Self {
        match &mut self {
            ClientMessage::CreateWorkout { request_id, .. }
            | ClientMessage::DeleteWorkout { request_id, .. }
            | ClientMessage::ListWorkouts { request_id, .. } => *request_id = new_id,
            ClientMessage::Ping { id } => *id = new_id,
        }
        self
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::CreateWorkout { .. } => "create_workout",
            ClientMessage::DeleteWorkout { .. } => "delete_workout",
            ClientMessage::ListWorkouts { .. } => "list_workouts",
            ClientMessage::Ping { .. } => "ping",
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates a Created message.
    pub fn created(request_id: u64, record: WorkoutRecord) -> Self {
        ServerMessage::Created { request_id, record }
    }

    /// Creates a Deleted message.
    pub fn deleted(request_id: u64) -> Self {
        ServerMessage::Deleted { request_id }
    }

    /// Creates a Workouts message.
    pub fn workouts(request_id: u64, records: Vec<WorkoutRecord>) -> Self {
        ServerMessage::Workouts { request_id, records }
    }

    /// Creates a Rejected message.
    pub fn rejected(request_id: u64, code: u16, reason: impl Into<String>) -> Self {
        ServerMessage::Rejected { request_id, code, reason: reason.into() }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error { message: message.into() }
    }

    /// Returns the request id this message answers, if any.
    ///
    /// `Error` frames are not tied to a request.
    pub fn correlation_id(&self) -> Option<u64> {
        match self {
            ServerMessage::Created { request_id, .. }
            | ServerMessage::Deleted { request_id }
            | ServerMessage::Workouts { request_id, .. }
            | ServerMessage::Rejected { request_id, .. } => Some(*request_id),
            ServerMessage::Pong { id } => Some(*id),
            ServerMessage::Error { .. } => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
