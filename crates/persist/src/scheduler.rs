// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic checkpoint triggering

use crate::context::PersistContext;
use me_core::PersistConfig;
use std::time::Duration;

/// What a triggered checkpoint must capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointTicket {
    /// Trigger time; names the snapshot partitions
    pub timestamp: i64,
    /// Last operation id reflected in the frozen state
    pub end_operation_id: u64,
}

/// Decides on each tick whether a checkpoint is due
#[derive(Debug, Clone, Copy)]
pub struct CheckpointScheduler {
    interval_secs: i64,
}

impl CheckpointScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_secs: i64::try_from(interval.as_secs()).unwrap_or(i64::MAX),
        }
    }

    pub fn from_config(config: &PersistConfig) -> Self {
        Self {
            interval_secs: config.checkpoint_interval_secs(),
        }
    }

    pub fn is_due(&self, ctx: &PersistContext, now: i64) -> bool {
        now.saturating_sub(ctx.last_checkpoint_time()) >= self.interval_secs
    }

    /// Trigger a checkpoint if one is due
    ///
    /// `last_checkpoint_time` advances to `now` here, whether or not the
    /// checkpoint later succeeds, so a failing store is retried once per
    /// interval rather than on every tick.
    pub fn tick(&self, ctx: &mut PersistContext, now: i64) -> Option<CheckpointTicket> {
        if !self.is_due(ctx, now) {
            return None;
        }
        let ticket = CheckpointTicket {
            timestamp: now,
            end_operation_id: ctx.last_operation_id(),
        };
        ctx.mark_triggered(now);
        tracing::info!(
            timestamp = ticket.timestamp,
            end_id = ticket.end_operation_id,
            "checkpoint triggered"
        );
        Some(ticket)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
