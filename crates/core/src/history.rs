// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint metadata

use serde::{Deserialize, Serialize};

/// One committed checkpoint, as recorded in `slice_history`
///
/// Ids are assigned by the store and strictly increase in creation order.
/// The entry with the highest id is the only recovery point that matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceHistoryEntry {
    pub id: u64,
    /// Checkpoint cutover time (unix seconds); suffix of the partition tables
    pub timestamp: i64,
    /// Last operation-log id included in the snapshot
    pub end_operation_id: u64,
}
