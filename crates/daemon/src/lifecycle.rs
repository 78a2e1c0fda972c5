// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use fs2::FileExt;
use me_core::{BookState, ConfigError, SystemClock};
use me_persist::{PersistError, Persistence, Recovered, RecoveryError, RecoveryOutcome};
use me_storage::{SqliteStore, StoreError, TracedStore};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::input::{self, Reply};

/// Backing store with tracing around every call
pub type DaemonStore = TracedStore<SqliteStore>;

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub persistence: Persistence<DaemonStore, SystemClock>,
    /// Live engine state
    pub book: BookState,
    pub start_time: Instant,
}

impl DaemonState {
    /// Handle one stdin line
    ///
    /// Malformed and rejected operations are answered and otherwise
    /// ignored. A failed log append is returned as an error: the live state
    /// is then ahead of the log and the daemon must stop.
    pub fn handle_line(&mut self, line: &str) -> Result<Option<Reply>, LifecycleError> {
        let op = match input::parse_operation(line) {
            Ok(Some(op)) => op,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "malformed operation");
                return Ok(Some(Reply::Malformed {
                    error: e.to_string(),
                }));
            }
        };

        let method = op.method();
        match self.persistence.record(&mut self.book, op) {
            Ok(entry) => Ok(Some(Reply::Logged { id: entry.id })),
            Err(PersistError::Apply(e)) => {
                warn!(method, error = %e, "operation rejected");
                Ok(Some(Reply::Rejected {
                    error: e.to_string(),
                }))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run a scheduler tick
    pub fn tick(&mut self) {
        self.persistence.on_tick(&self.book);
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) {
        info!(in_flight = self.persistence.in_flight(), "Shutting down daemon...");

        // 1. Drain checkpoint workers; their failures were already logged
        let failed = self
            .persistence
            .shutdown()
            .await
            .iter()
            .filter(|r| r.is_err())
            .count();
        if failed > 0 {
            warn!(failed, "checkpoints failed during this run");
        }

        // 2. Remove lock file; the lock itself is released when lock_file drops
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove lock file: {}", e);
            }
        }

        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "Daemon shutdown complete"
        );
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to read config {0}: {1}")]
    ReadConfig(PathBuf, std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Recovery failed: {0}")]
    Recovery(#[from] RecoveryError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Open the store backing `config`
pub fn open_store(config: &Config) -> Result<DaemonStore, LifecycleError> {
    Ok(TracedStore::new(SqliteStore::open(&config.store_path)?))
}

/// Start the daemon: lock the store, then recover before serving
pub fn startup(config: &Config) -> Result<(DaemonState, RecoveryOutcome), LifecycleError> {
    match startup_inner(config) {
        Ok(started) => Ok(started),
        Err(LifecycleError::LockFailed(e)) => Err(LifecycleError::LockFailed(e)),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
fn startup_inner(config: &Config) -> Result<(DaemonState, RecoveryOutcome), LifecycleError> {
    // 1. Create store directory
    if let Some(parent) = config.store_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 2. Acquire lock file FIRST - one writer per store
    let mut lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 3. Open store and recover; nothing is served on failure
    let store = open_store(config)?;
    let Recovered {
        persistence,
        state,
        outcome,
    } = Persistence::new(store, SystemClock, &config.persist).recover::<BookState>()?;

    info!(
        markets = state.market_count(),
        orders = state.order_count(),
        balances = state.balance_count(),
        cursor = outcome.cursor,
        "Recovered engine state from {}",
        config.store_path.display()
    );

    Ok((
        DaemonState {
            config: config.clone(),
            lock_file,
            persistence,
            book: state,
            start_time: Instant::now(),
        },
        outcome,
    ))
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
