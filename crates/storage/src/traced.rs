// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use crate::store::{BackingStore, StoreError};
use me_core::{OperationLogEntry, Row, SliceHistoryEntry};
use std::time::Instant;

/// Wrapper that adds tracing to any BackingStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: BackingStore> BackingStore for TracedStore<S> {
    fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        let result = self.inner.table_exists(table);
        tracing::trace!(table, exists = ?result.as_ref().ok(), "checked table");
        result
    }

    fn read_partition(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let span = tracing::info_span!("store.read_partition", table);
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.read_partition(table);
        let elapsed = start.elapsed();

        match &result {
            Ok(rows) => tracing::info!(
                rows = rows.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "partition loaded"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "partition load failed"
            ),
        }

        result
    }

    fn write_partition(&self, table: &str, rows: &[Row]) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.write_partition", table, rows = rows.len());
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.write_partition(table, rows);
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "partition written"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "partition write failed"
            ),
        }

        result
    }

    fn read_operlog(
        &self,
        table: &str,
        after_id: u64,
    ) -> Result<Vec<OperationLogEntry>, StoreError> {
        let span = tracing::info_span!("store.read_operlog", table, after_id);
        let _guard = span.enter();

        let result = self.inner.read_operlog(table, after_id);
        match &result {
            Ok(entries) => tracing::debug!(entries = entries.len(), "shard read"),
            Err(e) => tracing::error!(error = %e, "shard read failed"),
        }

        result
    }

    fn append_operlog(&self, table: &str, entry: &OperationLogEntry) -> Result<(), StoreError> {
        let result = self.inner.append_operlog(table, entry);
        match &result {
            Ok(()) => tracing::trace!(table, id = entry.id, "operation logged"),
            Err(e) => tracing::error!(table, id = entry.id, error = %e, "operation log append failed"),
        }
        result
    }

    fn latest_slice(&self) -> Result<Option<SliceHistoryEntry>, StoreError> {
        let result = self.inner.latest_slice();
        tracing::debug!(latest = ?result.as_ref().ok(), "read latest slice");
        result
    }

    fn insert_slice(
        &self,
        timestamp: i64,
        end_operation_id: u64,
    ) -> Result<SliceHistoryEntry, StoreError> {
        let span = tracing::info_span!("store.insert_slice", timestamp, end_operation_id);
        let _guard = span.enter();

        let result = self.inner.insert_slice(timestamp, end_operation_id);
        match &result {
            Ok(entry) => tracing::info!(id = entry.id, "slice history committed"),
            Err(e) => tracing::error!(error = %e, "slice history commit failed"),
        }

        result
    }

    fn list_slices(&self, limit: usize) -> Result<Vec<SliceHistoryEntry>, StoreError> {
        self.inner.list_slices(limit)
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
