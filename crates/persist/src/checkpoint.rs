// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Isolated checkpoint writing
//!
//! The live engine keeps running while a checkpoint is written. The worker
//! receives its own copy of the state taken at the trigger instant, so later
//! mutations never leak into the snapshot, and it reports back only through
//! its join handle and the log.

use crate::error::CheckpointError;
use crate::scheduler::CheckpointTicket;
use me_core::{EngineState, Partition, SliceHistoryEntry};
use me_storage::{BackingStore, HistoryLedger};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Writes the three snapshot partitions, then commits the history entry
#[derive(Clone)]
pub struct CheckpointWriter<S> {
    store: S,
}

impl<S: BackingStore> CheckpointWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Dump `frozen` and commit it to `slice_history`
    ///
    /// Stops at the first failed partition. Nothing is recorded in the
    /// ledger unless all three partitions were written; partitions already
    /// written by a failed attempt are left behind unreferenced.
    pub fn write<E: EngineState>(
        &self,
        frozen: &E,
        ticket: CheckpointTicket,
    ) -> Result<SliceHistoryEntry, CheckpointError> {
        for partition in Partition::ALL {
            let table = partition.table(ticket.timestamp);
            let rows = frozen
                .dump(partition)
                .map_err(|source| CheckpointError::Encode {
                    table: table.clone(),
                    source,
                })?;
            self.store
                .write_partition(&table, &rows)
                .map_err(|source| CheckpointError::Write {
                    table: table.clone(),
                    source,
                })?;
            info!(table = %table, rows = rows.len(), "dumped {}", partition);
        }

        HistoryLedger::new(self.store.clone())
            .append(ticket.timestamp, ticket.end_operation_id)
            .map_err(CheckpointError::Commit)
    }

    /// Copy `state` now and write it on a blocking worker
    ///
    /// The worker logs its own outcome; the handle is only awaited at
    /// shutdown or to reap finished workers.
    pub fn spawn<E: EngineState>(
        &self,
        state: &E,
        ticket: CheckpointTicket,
    ) -> JoinHandle<Result<SliceHistoryEntry, CheckpointError>> {
        let frozen = state.clone();
        let writer = self.clone();
        tokio::task::spawn_blocking(move || {
            let span = tracing::info_span!(
                "checkpoint",
                timestamp = ticket.timestamp,
                end_id = ticket.end_operation_id
            );
            let _guard = span.enter();
            let start = Instant::now();

            let result = writer.write(&frozen, ticket);
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(entry) => info!(id = entry.id, elapsed_ms, "checkpoint complete"),
                Err(e) => error!(elapsed_ms, error = %e, "checkpoint failed"),
            }
            result
        })
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
