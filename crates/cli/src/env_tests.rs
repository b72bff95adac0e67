// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::FITSYNC_STATE_DIR, "FITSYNC_STATE_DIR");
    assert_eq!(vars::FITSYNC_TOKEN, "FITSYNC_TOKEN");
    assert_eq!(vars::XDG_STATE_HOME, "XDG_STATE_HOME");
    assert_eq!(vars::RUST_LOG, "RUST_LOG");
}

// Only this test touches FITSYNC_TOKEN so parallel tests cannot race on it.
#[test]
fn test_token_set_unset_and_empty() {
    std::env::remove_var("FITSYNC_TOKEN");
    assert_eq!(token(), None);

    std::env::set_var("FITSYNC_TOKEN", "abc");
    assert_eq!(token(), Some("abc".to_string()));

    std::env::set_var("FITSYNC_TOKEN", "");
    assert_eq!(token(), None);

    std::env::remove_var("FITSYNC_TOKEN");
}
