// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction for testable checkpoint timing
//!
//! Checkpoint timestamps and operation-log shards are keyed by wall-clock
//! time (unix seconds and local calendar days), so this clock reports
//! `DateTime<Utc>` rather than a monotonic `Instant`.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A clock that provides the current wall-clock time
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as unix seconds
    fn unix_now(&self) -> i64 {
        self.now().timestamp()
    }

    /// Current calendar day in local time
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Utc::now())),
        }
    }

    /// Create a clock fixed at the given unix timestamp
    pub fn at(unix_secs: i64) -> Self {
        let clock = Self::new();
        clock.set_unix(unix_secs);
        clock
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Ok(delta) = chrono::Duration::from_std(duration) {
            *current += delta;
        }
    }

    /// Set the clock to a specific unix timestamp
    pub fn set_unix(&self, unix_secs: i64) {
        if let Some(at) = Utc.timestamp_opt(unix_secs, 0).single() {
            *self.current.lock().unwrap_or_else(|e| e.into_inner()) = at;
        }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
