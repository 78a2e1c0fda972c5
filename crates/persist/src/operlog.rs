// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live operation logging into day shards

use crate::context::PersistContext;
use me_core::{local_date, operlog_table, Clock, Operation, OperationLogEntry};
use me_storage::{BackingStore, StoreError};

/// Appends accepted operations to today's shard with the next id
#[derive(Clone)]
pub struct OperlogWriter<S, C> {
    store: S,
    clock: C,
}

impl<S: BackingStore, C: Clock> OperlogWriter<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Log `detail` as the operation following `ctx.last_operation_id()`
    ///
    /// The id is only consumed once the append succeeds, so a failed append
    /// leaves no gap.
    pub fn append(
        &self,
        ctx: &mut PersistContext,
        detail: Operation,
    ) -> Result<OperationLogEntry, StoreError> {
        let time = self.clock.unix_now();
        let table = operlog_table(local_date(time));
        let entry = OperationLogEntry {
            id: ctx.next_operation_id(),
            time,
            detail,
        };
        self.store.append_operlog(&table, &entry)?;
        ctx.commit_operation_id(entry.id);
        tracing::debug!(table = %table, id = entry.id, method = entry.detail.method(), "logged operation");
        Ok(entry)
    }
}

#[cfg(test)]
#[path = "operlog_tests.rs"]
mod tests;
