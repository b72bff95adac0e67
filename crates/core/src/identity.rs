// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque identity credential attached to remote calls.
//!
//! The token is issued by the authentication service and never inspected
//! here. `Debug` and `Display` print a short fingerprint instead of the
//! token so it cannot leak into logs.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// An authenticated identity, carried as an opaque bearer token.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a token, rejecting empty or whitespace-only values.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::EmptyIdentity);
        }
        Ok(Identity(token))
    }

    /// Returns the raw token for attaching to a request.
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Returns the first 8 hex chars of SHA-256 over the token.
    pub fn fingerprint(&self) -> String {
        let hash = Sha256::digest(self.0.as_bytes());
        hex::encode(&hash[..4])
    }

    /// Derives a stable stamp node id for this identity's device queue.
    pub fn node_id(&self) -> u32 {
        let hash = Sha256::digest(self.0.as_bytes());
        u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identity").field(&self.fingerprint()).finish()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "identity:{}", self.fingerprint())
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
