// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Workout entries as logged by the user and stored by the remote API.
//!
//! Workouts are append-only: they are created and deleted, never edited.
//! Each entry carries a client-generated id so that a delete queued while
//! offline can be correlated with the create that preceded it, and so that
//! a create replayed twice is recognised by the remote as the same entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Unit the workout amount is measured in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutUnit {
    /// Repetitions (push-ups, squats).
    #[default]
    Reps,
    /// Held or timed exercises (planks).
    Seconds,
    /// Longer timed sessions.
    Minutes,
    /// Short distances.
    Meters,
    /// Runs and rides.
    Kilometers,
}

impl WorkoutUnit {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutUnit::Reps => "reps",
            WorkoutUnit::Seconds => "seconds",
            WorkoutUnit::Minutes => "minutes",
            WorkoutUnit::Meters => "meters",
            WorkoutUnit::Kilometers => "kilometers",
        }
    }
}

impl fmt::Display for WorkoutUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkoutUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "reps" | "rep" => Ok(WorkoutUnit::Reps),
            "seconds" | "sec" | "s" => Ok(WorkoutUnit::Seconds),
            "minutes" | "min" => Ok(WorkoutUnit::Minutes),
            "meters" | "m" => Ok(WorkoutUnit::Meters),
            "kilometers" | "km" => Ok(WorkoutUnit::Kilometers),
            _ => Err(Error::InvalidUnit(s.to_string())),
        }
    }
}

/// The fields needed to create (or replay the creation of) a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutFields {
    /// Client-generated id, also used to correlate deletes.
    pub client_workout_id: String,
    /// Exercise name, e.g. "push-up".
    pub exercise_type: String,
    /// Amount performed, measured in `unit`.
    pub amount: f64,
    #[serde(default)]
    pub unit: WorkoutUnit,
    /// When the workout was performed.
    pub performed_at: DateTime<Utc>,
}

impl WorkoutFields {
    /// Builds validated fields with a freshly generated client id.
    pub fn new(
        exercise_type: impl Into<String>,
        amount: f64,
        unit: WorkoutUnit,
        performed_at: DateTime<Utc>,
    ) -> Result<Self> {
        let exercise_type = exercise_type.into().trim().to_string();
        let client_workout_id = generate_workout_id(&exercise_type, amount, &performed_at);
        let fields = WorkoutFields {
            client_workout_id,
            exercise_type,
            amount,
            unit,
            performed_at,
        };
        fields.validate()?;
        Ok(fields)
    }

    /// Checks the rules the remote API enforces, so obviously bad input
    /// is refused before it is queued.
    pub fn validate(&self) -> Result<()> {
        if self.client_workout_id.trim().is_empty() {
            return Err(Error::InvalidWorkout("client workout id is required".into()));
        }
        if self.exercise_type.trim().is_empty() {
            return Err(Error::InvalidWorkout("exercise type is required".into()));
        }
        if self.exercise_type.chars().count() > MAX_EXERCISE_LEN {
            return Err(Error::InvalidWorkout(format!(
                "exercise type exceeds {MAX_EXERCISE_LEN} characters"
            )));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidWorkout(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Longest exercise name accepted.
pub const MAX_EXERCISE_LEN: usize = 64;

/// A workout as acknowledged by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    /// Server-assigned id.
    pub id: String,
    /// Owner fingerprint (never the raw token).
    pub owner: String,
    #[serde(flatten)]
    pub fields: WorkoutFields,
    /// When the remote first stored the workout.
    pub recorded_at: DateTime<Utc>,
}

/// Generate a client workout id.
/// Format: `w-{hash}` where hash is the first 8 hex chars of
/// SHA256 over exercise, amount and timestamp, NUL-separated.
pub fn generate_workout_id(exercise_type: &str, amount: f64, performed_at: &DateTime<Utc>) -> String {
    let input = format!("{}\0{}\0{}", exercise_type, amount, performed_at.to_rfc3339());
    let hash = Sha256::digest(input.as_bytes());
    format!("w-{}", hex::encode(&hash[..4]))
}

#[cfg(test)]
#[path = "workout_tests.rs"]
mod tests;
