// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backing-store interface

use me_core::{OperationLogEntry, Row, SliceHistoryEntry};
use thiserror::Error;

/// Errors from backing-store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot connect to {target}: {reason}")]
    Connection { target: String, reason: String },
    #[error("{context}: {source}")]
    Query {
        context: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("invalid table name: {0:?}")]
    InvalidTable(String),
    #[error("malformed payload in {table}: {source}")]
    Payload {
        table: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable store for snapshot partitions, day-sharded operation logs and
/// checkpoint history
///
/// Calls are synchronous. Implementations must be cheap to clone so an
/// isolated checkpoint worker can own its own handle.
pub trait BackingStore: Clone + Send + Sync + 'static {
    /// Check whether a table exists
    fn table_exists(&self, table: &str) -> Result<bool, StoreError>;

    /// Read every row of a snapshot partition
    ///
    /// A missing table is [`StoreError::TableNotFound`].
    fn read_partition(&self, table: &str) -> Result<Vec<Row>, StoreError>;

    /// Replace a snapshot partition with `rows`
    fn write_partition(&self, table: &str, rows: &[Row]) -> Result<(), StoreError>;

    /// Read shard entries with id greater than `after_id`, ascending by id
    fn read_operlog(&self, table: &str, after_id: u64)
        -> Result<Vec<OperationLogEntry>, StoreError>;

    /// Append one entry to a shard, creating the shard if needed
    fn append_operlog(&self, table: &str, entry: &OperationLogEntry) -> Result<(), StoreError>;

    /// The `slice_history` row with the highest id
    fn latest_slice(&self) -> Result<Option<SliceHistoryEntry>, StoreError>;

    /// Insert a `slice_history` row; the store assigns the id
    fn insert_slice(
        &self,
        timestamp: i64,
        end_operation_id: u64,
    ) -> Result<SliceHistoryEntry, StoreError>;

    /// Most recent `slice_history` rows, newest first
    fn list_slices(&self, limit: usize) -> Result<Vec<SliceHistoryEntry>, StoreError>;
}
