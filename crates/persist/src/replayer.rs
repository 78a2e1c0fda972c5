// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Day-sharded operation-log replay

use crate::error::ReplayError;
use chrono::NaiveDate;
use me_core::{operlog_table, EngineState};
use me_storage::BackingStore;
use tracing::{info, warn};

/// Result of replaying one day's shard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayReplay {
    /// Id of the last applied entry, or the input cursor if nothing applied
    pub cursor: u64,
    /// False when the day has no shard at all
    pub shard_present: bool,
    pub applied: usize,
}

/// Applies operation-log shards to engine state, advancing a cursor
pub struct OperationLogReplayer<S> {
    store: S,
}

impl<S: BackingStore> OperationLogReplayer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Apply every entry of `date`'s shard with id above `cursor`
    ///
    /// Entries are applied once each in ascending id order. A missing shard
    /// is not an error: the cursor comes back unchanged with
    /// `shard_present == false`.
    pub fn replay_day<E: EngineState>(
        &self,
        state: &mut E,
        date: NaiveDate,
        cursor: u64,
    ) -> Result<DayReplay, ReplayError> {
        let table = operlog_table(date);
        let store_error = |source| ReplayError::Store {
            table: table.clone(),
            source,
        };

        if !self.store.table_exists(&table).map_err(store_error)? {
            warn!(table = %table, cursor, "operation log shard not found, skipping day");
            return Ok(DayReplay {
                cursor,
                shard_present: false,
                applied: 0,
            });
        }

        let mut entries = self.store.read_operlog(&table, cursor).map_err(store_error)?;
        entries.sort_by_key(|entry| entry.id);

        let mut cursor = cursor;
        let mut applied = 0;
        for entry in entries {
            if entry.id <= cursor {
                continue;
            }
            state
                .apply(&entry.detail)
                .map_err(|source| ReplayError::Apply {
                    table: table.clone(),
                    id: entry.id,
                    source,
                })?;
            cursor = entry.id;
            applied += 1;
        }

        info!(table = %table, cursor, applied, "operation log shard replayed");
        Ok(DayReplay {
            cursor,
            shard_present: true,
            applied,
        })
    }
}

#[cfg(test)]
#[path = "replayer_tests.rs"]
mod tests;
