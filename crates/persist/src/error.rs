// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for recovery and checkpointing

use crate::lifecycle::LifecyclePhase;
use me_core::{ApplyError, StateError};
use me_storage::StoreError;
use thiserror::Error;

/// Errors replaying one operation-log shard
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("reading {table} failed: {source}")]
    Store {
        table: String,
        #[source]
        source: StoreError,
    },
    #[error("applying operation {id} from {table} failed: {source}")]
    Apply {
        table: String,
        id: u64,
        #[source]
        source: ApplyError,
    },
}

/// Errors during startup recovery; all of them abort startup
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("reading slice_history failed: {0}")]
    History(#[source] StoreError),
    #[error("loading snapshot partition {table} failed: {source}")]
    SnapshotLoad {
        table: String,
        #[source]
        source: StoreError,
    },
    #[error("decoding snapshot partition {table} failed: {source}")]
    SnapshotDecode {
        table: String,
        #[source]
        source: StateError,
    },
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("recovery needs a service that has not started, found {0:?}")]
    InvalidPhase(LifecyclePhase),
}

/// Errors inside an isolated checkpoint attempt; logged, never propagated
/// into the live engine
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("encoding {table} failed: {source}")]
    Encode {
        table: String,
        #[source]
        source: StateError,
    },
    #[error("writing {table} failed: {source}")]
    Write {
        table: String,
        #[source]
        source: StoreError,
    },
    #[error("committing slice_history failed: {0}")]
    Commit(#[source] StoreError),
    #[error("checkpoint worker died: {0}")]
    Worker(String),
}

/// Errors on the live recording path
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("persistence is not serving (phase {0:?})")]
    NotServing(LifecyclePhase),
    #[error("operation rejected: {0}")]
    Apply(#[from] ApplyError),
    #[error("operation log append failed: {0}")]
    Log(#[from] StoreError),
}
