// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! fit-core: Shared library for the fitsync workout sync engine
//!
//! This crate provides the data model, wire protocol and storage primitives
//! used by both the fitsync client and the fit-remote reference server.

pub mod error;
pub mod identity;
pub mod jsonl;
pub mod mutation;
pub mod protocol;
pub mod stamp;
pub mod workout;

pub use error::{Error, Result};
pub use identity::Identity;
pub use mutation::{MutationId, MutationKind, MutationPayload, QueuedMutation, QueuedMutationInput};
pub use stamp::{ClockSource, ManualClock, Stamp, StampClock, SystemClock};
pub use workout::{WorkoutFields, WorkoutRecord, WorkoutUnit};
