// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hybrid logical stamps used as queued mutation identifiers.
//!
//! A stamp pairs the wall clock with a logical counter so that every stamp
//! issued by one [`StampClock`] is unique and strictly greater than the
//! previous one, even when the wall clock stalls or steps backwards.
//!
//! Format: `{wall_ms}-{counter}-{node_id}`

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// A unique, totally ordered mutation stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stamp {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Logical counter for stamps issued within the same millisecond.
    pub counter: u32,
    /// Node identifier for deterministic tiebreaking between devices.
    pub node_id: u32,
}

impl Stamp {
    /// Creates a new stamp with the given components.
    pub fn new(wall_ms: u64, counter: u32, node_id: u32) -> Self {
        Stamp { wall_ms, counter, node_id }
    }

    /// Returns the wall-clock component as a UTC timestamp.
    pub fn wall_time(&self) -> DateTime<Utc> {
        millis_to_utc(self.wall_ms)
    }
}

impl Ord for Stamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wall_ms
            .cmp(&other.wall_ms)
            .then_with(|| self.counter.cmp(&other.counter))
            .then_with(|| self.node_id.cmp(&other.node_id))
    }
}

impl PartialOrd for Stamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wall_ms, self.counter, self.node_id)
    }
}

impl FromStr for Stamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('-');
        let (Some(wall), Some(counter), Some(node), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidStamp(format!(
                "expected format 'wall_ms-counter-node_id', got '{s}'"
            )));
        };

        let wall_ms = wall
            .parse::<u64>()
            .map_err(|_| Error::InvalidStamp(format!("invalid wall_ms '{wall}' in '{s}'")))?;
        let counter = counter
            .parse::<u32>()
            .map_err(|_| Error::InvalidStamp(format!("invalid counter '{counter}' in '{s}'")))?;
        let node_id = node
            .parse::<u32>()
            .map_err(|_| Error::InvalidStamp(format!("invalid node_id '{node}' in '{s}'")))?;

        Ok(Stamp::new(wall_ms, counter, node_id))
    }
}

/// Converts milliseconds since the Unix epoch into a UTC timestamp.
pub fn millis_to_utc(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Source of wall-clock time.
///
/// Injected into the queue and the engine so tests control time.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;

    /// Returns the current time as a UTC timestamp.
    fn now_utc(&self) -> DateTime<Utc> {
        millis_to_utc(self.now_ms())
    }
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

/// A manually driven clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    time_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at the given time.
    pub fn new(initial_ms: u64) -> Self {
        ManualClock { time_ms: AtomicU64::new(initial_ms) }
    }

    /// Sets the current time.
    pub fn set(&self, ms: u64) {
        self.time_ms.store(ms, AtomicOrdering::SeqCst);
    }

    /// Moves the clock forward.
    pub fn advance(&self, ms: u64) {
        self.time_ms.fetch_add(ms, AtomicOrdering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(AtomicOrdering::SeqCst)
    }
}

impl<C: ClockSource + ?Sized> ClockSource for std::sync::Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Issues strictly increasing [`Stamp`]s for one node.
pub struct StampClock<C: ClockSource = SystemClock> {
    clock: C,
    node_id: u32,
    last: Mutex<(u64, u32)>,
}

impl StampClock<SystemClock> {
    /// Creates a stamp clock backed by the system clock.
    pub fn new(node_id: u32) -> Self {
        Self::with_clock(SystemClock, node_id)
    }
}

impl<C: ClockSource> StampClock<C> {
    /// Creates a stamp clock with a custom clock source.
    pub fn with_clock(clock: C, node_id: u32) -> Self {
        StampClock { clock, node_id, last: Mutex::new((0, 0)) }
    }

    /// Returns the node ID for this clock.
    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    /// Returns the underlying clock source.
    pub fn source(&self) -> &C {
        &self.clock
    }

    /// Resumes after a previously issued stamp, e.g. one loaded from disk.
    ///
    /// Later stamps are guaranteed to sort after `seen`.
    pub fn observe(&self, seen: &Stamp) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if (seen.wall_ms, seen.counter) > *last {
            *last = (seen.wall_ms, seen.counter);
        }
    }

    /// Issues the next stamp.
    pub fn next(&self) -> Stamp {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        let (wall_ms, counter) = if physical > last.0 {
            (physical, 0)
        } else {
            // Wall clock stalled or went backwards: stay on the last wall time
            (last.0, last.1.saturating_add(1))
        };
        *last = (wall_ms, counter);

        Stamp::new(wall_ms, counter, self.node_id)
    }
}

#[cfg(test)]
#[path = "stamp_tests.rs"]
mod tests;
