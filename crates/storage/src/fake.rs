// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake backing store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::store::{BackingStore, StoreError};
use me_core::{OperationLogEntry, Row, SliceHistoryEntry, SLICE_HISTORY_TABLE};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    TableExists { table: String },
    ReadPartition { table: String },
    WritePartition { table: String, rows: usize },
    ReadOperlog { table: String, after_id: u64 },
    AppendOperlog { table: String, id: u64 },
    LatestSlice,
    InsertSlice { timestamp: i64, end_operation_id: u64 },
    ListSlices { limit: usize },
}

#[derive(Default)]
struct FakeTables {
    partitions: HashMap<String, Vec<Row>>,
    operlogs: HashMap<String, BTreeMap<u64, OperationLogEntry>>,
    history: Vec<SliceHistoryEntry>,
    next_slice_id: u64,
    failing_prefixes: Vec<String>,
    unreachable: bool,
}

impl FakeTables {
    fn check(&self, table: &str) -> Result<(), StoreError> {
        if self.unreachable {
            return Err(StoreError::Connection {
                target: "fake".to_string(),
                reason: "unreachable".to_string(),
            });
        }
        if self.failing_prefixes.iter().any(|p| table.starts_with(p)) {
            return Err(StoreError::Unavailable(format!("injected failure on {}", table)));
        }
        Ok(())
    }
}

/// In-memory backing store with call recording and failure injection
#[derive(Clone, Default)]
pub struct FakeStore {
    tables: Arc<Mutex<FakeTables>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Fail every call touching a table whose name starts with `prefix`
    pub fn fail_tables(&self, prefix: &str) {
        self.lock().failing_prefixes.push(prefix.to_string());
    }

    /// Remove all injected table failures
    pub fn clear_failures(&self) {
        self.lock().failing_prefixes.clear();
    }

    /// Make every call fail with a connection error
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// All committed history entries, in insertion order
    pub fn history(&self) -> Vec<SliceHistoryEntry> {
        self.lock().history.clone()
    }

    /// Rows of a partition, if it was written
    pub fn partition(&self, table: &str) -> Option<Vec<Row>> {
        self.lock().partitions.get(table).cloned()
    }

    /// Store entries in a shard without recording calls
    pub fn seed_operlog(&self, table: &str, entries: impl IntoIterator<Item = OperationLogEntry>) {
        let mut tables = self.lock();
        let shard = tables.operlogs.entry(table.to_string()).or_default();
        for entry in entries {
            shard.insert(entry.id, entry);
        }
    }

    /// Store a partition without recording calls
    pub fn seed_partition(&self, table: &str, rows: Vec<Row>) {
        self.lock().partitions.insert(table.to_string(), rows);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeTables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl BackingStore for FakeStore {
    fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        self.record(StoreCall::TableExists {
            table: table.to_string(),
        });
        let tables = self.lock();
        tables.check(table)?;
        Ok(tables.partitions.contains_key(table)
            || tables.operlogs.contains_key(table)
            || table == SLICE_HISTORY_TABLE)
    }

    fn read_partition(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        self.record(StoreCall::ReadPartition {
            table: table.to_string(),
        });
        let tables = self.lock();
        tables.check(table)?;
        tables
            .partitions
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn write_partition(&self, table: &str, rows: &[Row]) -> Result<(), StoreError> {
        self.record(StoreCall::WritePartition {
            table: table.to_string(),
            rows: rows.len(),
        });
        let mut tables = self.lock();
        tables.check(table)?;
        tables.partitions.insert(table.to_string(), rows.to_vec());
        Ok(())
    }

    fn read_operlog(
        &self,
        table: &str,
        after_id: u64,
    ) -> Result<Vec<OperationLogEntry>, StoreError> {
        self.record(StoreCall::ReadOperlog {
            table: table.to_string(),
            after_id,
        });
        let tables = self.lock();
        tables.check(table)?;
        let shard = tables
            .operlogs
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        Ok(shard
            .range(after_id.saturating_add(1)..)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    fn append_operlog(&self, table: &str, entry: &OperationLogEntry) -> Result<(), StoreError> {
        self.record(StoreCall::AppendOperlog {
            table: table.to_string(),
            id: entry.id,
        });
        let mut tables = self.lock();
        tables.check(table)?;
        tables
            .operlogs
            .entry(table.to_string())
            .or_default()
            .insert(entry.id, entry.clone());
        Ok(())
    }

    fn latest_slice(&self) -> Result<Option<SliceHistoryEntry>, StoreError> {
        self.record(StoreCall::LatestSlice);
        let tables = self.lock();
        tables.check(SLICE_HISTORY_TABLE)?;
        Ok(tables.history.iter().max_by_key(|e| e.id).copied())
    }

    fn insert_slice(
        &self,
        timestamp: i64,
        end_operation_id: u64,
    ) -> Result<SliceHistoryEntry, StoreError> {
        self.record(StoreCall::InsertSlice {
            timestamp,
            end_operation_id,
        });
        let mut tables = self.lock();
        tables.check(SLICE_HISTORY_TABLE)?;
        tables.next_slice_id += 1;
        let entry = SliceHistoryEntry {
            id: tables.next_slice_id,
            timestamp,
            end_operation_id,
        };
        tables.history.push(entry);
        Ok(entry)
    }

    fn list_slices(&self, limit: usize) -> Result<Vec<SliceHistoryEntry>, StoreError> {
        self.record(StoreCall::ListSlices { limit });
        let tables = self.lock();
        tables.check(SLICE_HISTORY_TABLE)?;
        let mut entries = tables.history.clone();
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
