// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use fit_core::MutationPayload;

use super::*;
use crate::commands::testing::{fields, TestContext};
use crate::error::Error;

#[test]
fn test_sync_without_remote_fails_with_hint() {
    let t = TestContext::new().with_token("t-1");
    let err = run(&t.context()).unwrap_err();

    assert!(matches!(err, Error::NoRemote));
    assert!(err.to_string().contains("fitsync config remote"));
}

#[test]
fn test_sync_while_unreachable_leaves_queue_untouched() {
    let t = TestContext::new()
        .with_token("t-1")
        .with_remote("ws://127.0.0.1:1");
    let ctx = t.context();
    ctx.open_queue()
        .unwrap()
        .enqueue(MutationPayload::create(fields("squat", 10.0)))
        .unwrap();

    run(&ctx).unwrap();

    let pending = ctx.open_queue().unwrap().list();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].attempts, 0);
}
