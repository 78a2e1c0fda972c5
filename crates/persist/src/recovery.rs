// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup recovery: latest checkpoint plus operation-log replay

use crate::error::RecoveryError;
use crate::replayer::OperationLogReplayer;
use chrono::NaiveDate;
use me_core::{local_date, Clock, EngineState, Partition, SliceHistoryEntry};
use me_storage::{BackingStore, HistoryLedger};
use tracing::{info, warn};

/// What recovery found and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOutcome {
    /// Checkpoint the state was loaded from, if any
    pub checkpoint: Option<SliceHistoryEntry>,
    /// Last applied operation id; published as `operlog_id_start`
    pub cursor: u64,
    /// Operations applied on top of the checkpoint
    pub applied: usize,
    pub shards_replayed: usize,
    pub shards_missing: usize,
}

/// Rebuilds engine state from the backing store at startup
pub struct RecoveryCoordinator<S, C> {
    store: S,
    clock: C,
}

impl<S: BackingStore, C: Clock> RecoveryCoordinator<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Load the latest checkpoint and replay the log forward to today
    ///
    /// Any failure is fatal: no partially recovered state is returned.
    pub fn recover<E: EngineState + Default>(&self) -> Result<(E, RecoveryOutcome), RecoveryError> {
        let span = tracing::info_span!("recovery");
        let _guard = span.enter();

        let latest = HistoryLedger::new(self.store.clone())
            .latest()
            .map_err(RecoveryError::History)?;
        let today = self.clock.today();
        let mut state = E::default();

        let (first_day, start_cursor) = match latest {
            None => {
                info!("no checkpoint in slice_history, starting from an empty engine");
                (today, 0)
            }
            Some(entry) => {
                info!(
                    id = entry.id,
                    timestamp = entry.timestamp,
                    end_id = entry.end_operation_id,
                    "loading checkpoint"
                );
                self.load_snapshot(&mut state, entry.timestamp)?;
                (local_date(entry.timestamp), entry.end_operation_id)
            }
        };

        if first_day > today {
            warn!(%first_day, %today, "checkpoint is dated after today, nothing to replay");
        }

        let replayer = OperationLogReplayer::new(self.store.clone());
        let mut outcome = RecoveryOutcome {
            checkpoint: latest,
            cursor: start_cursor,
            applied: 0,
            shards_replayed: 0,
            shards_missing: 0,
        };
        for date in days_between(first_day, today) {
            let day = replayer.replay_day(&mut state, date, outcome.cursor)?;
            outcome.cursor = day.cursor;
            outcome.applied += day.applied;
            if day.shard_present {
                outcome.shards_replayed += 1;
            } else {
                outcome.shards_missing += 1;
            }
        }

        info!(
            cursor = outcome.cursor,
            applied = outcome.applied,
            shards_replayed = outcome.shards_replayed,
            shards_missing = outcome.shards_missing,
            "recovery complete"
        );
        Ok((state, outcome))
    }

    fn load_snapshot<E: EngineState>(&self, state: &mut E, timestamp: i64) -> Result<(), RecoveryError> {
        for partition in Partition::ALL {
            let table = partition.table(timestamp);
            let rows = self
                .store
                .read_partition(&table)
                .map_err(|source| RecoveryError::SnapshotLoad {
                    table: table.clone(),
                    source,
                })?;
            info!(table = %table, rows = rows.len(), "loading {}", partition);
            state
                .load(partition, rows)
                .map_err(|source| RecoveryError::SnapshotDecode { table, source })?;
        }
        Ok(())
    }
}

/// Calendar days from `first` through `last` inclusive
fn days_between(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    first.iter_days().take_while(move |day| *day <= last)
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
