// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Checkpointing and crash recovery for the matching engine
//!
//! ## Architecture
//!
//! ```text
//! startup:  HistoryLedger.latest ─► load slice_*_<T> ─► replay operlog_<day> .. today
//!                                                              │
//!                                                              ▼
//!                                                   PersistContext (operlog_id_start)
//!
//! serving:  tick ─► CheckpointScheduler ─► clone state ─► worker: dump ×3 ─► commit slice_history
//! ```
//!
//! A checkpoint only becomes visible to recovery once its `slice_history`
//! row is committed, and that row is written only after all three
//! partitions are. A failed checkpoint leaves the previous one authoritative.

mod checkpoint;
mod context;
mod error;
mod lifecycle;
mod operlog;
mod recovery;
mod replayer;
mod scheduler;

pub use checkpoint::CheckpointWriter;
pub use context::PersistContext;
pub use error::{CheckpointError, PersistError, RecoveryError, ReplayError};
pub use lifecycle::{LifecyclePhase, Persistence, Recovered};
pub use operlog::OperlogWriter;
pub use recovery::{RecoveryCoordinator, RecoveryOutcome};
pub use replayer::{DayReplay, OperationLogReplayer};
pub use scheduler::{CheckpointScheduler, CheckpointTicket};
