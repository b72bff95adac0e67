// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use fit_core::{MutationKind, Stamp};

use super::*;

#[test]
fn test_event_lines() {
    assert_eq!(format_pending(3), "pending: 3");
    assert_eq!(format_syncing(true), "syncing...");
    assert_eq!(format_syncing(false), "idle");
    assert_eq!(format_connectivity(true), "online");
    assert_eq!(format_connectivity(false), "offline");
}

#[test]
fn test_dropped_line() {
    let dropped = DroppedMutation {
        id: Stamp::new(1, 0, 1),
        kind: MutationKind::CreateWorkout,
        workout_id: "w-1".into(),
        reason: "rejected (422): bad amount".into(),
    };
    assert_eq!(
        format_dropped(&dropped),
        "dropped create w-1: rejected (422): bad amount"
    );
}
