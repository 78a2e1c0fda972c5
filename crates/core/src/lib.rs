// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! me-core: domain types shared by the matching engine's persistence layer
//!
//! This crate provides:
//! - Checkpoint metadata and operation-log records
//! - Backing-store table naming (snapshot partitions, day shards)
//! - The [`EngineState`] seam between persistence and the engine
//! - A wall-clock abstraction and persistence configuration

pub mod clock;
pub mod config;
pub mod history;
pub mod operation;
pub mod state;
pub mod table;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, PersistConfig};
pub use history::SliceHistoryEntry;
pub use operation::{Operation, OperationLogEntry, Side};
pub use state::{ApplyError, Balance, BookState, EngineState, Market, Order, Row, StateError};
pub use table::{is_valid_table_name, local_date, operlog_table, Partition, SLICE_HISTORY_TABLE};
