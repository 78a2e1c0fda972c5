// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint history ledger
//!
//! Append-only record of committed checkpoints. An entry is only ever
//! appended after all three snapshot partitions are durably written, so the
//! newest entry always names a complete snapshot.

use crate::store::{BackingStore, StoreError};
use me_core::SliceHistoryEntry;

/// Durable, append-only record of checkpoint metadata
#[derive(Clone)]
pub struct HistoryLedger<S> {
    store: S,
}

impl<S: BackingStore> HistoryLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a committed checkpoint; the store assigns a monotonic id
    pub fn append(
        &self,
        timestamp: i64,
        end_operation_id: u64,
    ) -> Result<SliceHistoryEntry, StoreError> {
        let entry = self.store.insert_slice(timestamp, end_operation_id)?;
        tracing::info!(
            id = entry.id,
            timestamp = entry.timestamp,
            end_id = entry.end_operation_id,
            "checkpoint committed to slice_history"
        );
        Ok(entry)
    }

    /// The authoritative recovery point, if any checkpoint was ever committed
    pub fn latest(&self) -> Result<Option<SliceHistoryEntry>, StoreError> {
        self.store.latest_slice()
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<SliceHistoryEntry>, StoreError> {
        self.store.list_slices(limit)
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
