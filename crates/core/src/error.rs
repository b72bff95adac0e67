// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for fit-core operations.

use thiserror::Error;

/// All possible errors that can occur in fit-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid workout: {0}")]
    InvalidWorkout(String),

    #[error("invalid unit: '{0}'\n  hint: valid units are: reps, seconds, minutes, meters, kilometers")]
    InvalidUnit(String),

    #[error("invalid mutation stamp: {0}")]
    InvalidStamp(String),

    #[error("identity token must not be empty")]
    EmptyIdentity,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for fit-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
