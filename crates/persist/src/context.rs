// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide persistence state

/// Scheduling and numbering state owned by the persistence service
///
/// Only recovery creates one. `last_checkpoint_time` moves when a
/// checkpoint is triggered, not when it completes. `operlog_id_start` is
/// fixed at the end of recovery; live logging continues numbering after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistContext {
    last_checkpoint_time: i64,
    operlog_id_start: u64,
    last_operation_id: u64,
}

impl PersistContext {
    pub(crate) fn recovered(last_checkpoint_time: i64, operlog_id_start: u64) -> Self {
        Self {
            last_checkpoint_time,
            operlog_id_start,
            last_operation_id: operlog_id_start,
        }
    }

    /// Unix time of the most recent checkpoint trigger (0 if none)
    pub fn last_checkpoint_time(&self) -> i64 {
        self.last_checkpoint_time
    }

    /// Cursor published at the end of recovery
    pub fn operlog_id_start(&self) -> u64 {
        self.operlog_id_start
    }

    /// Id of the last operation durably logged (or replayed)
    pub fn last_operation_id(&self) -> u64 {
        self.last_operation_id
    }

    pub(crate) fn mark_triggered(&mut self, now: i64) {
        self.last_checkpoint_time = now;
    }

    pub(crate) fn next_operation_id(&self) -> u64 {
        self.last_operation_id + 1
    }

    pub(crate) fn commit_operation_id(&mut self, id: u64) {
        self.last_operation_id = id;
    }
}
