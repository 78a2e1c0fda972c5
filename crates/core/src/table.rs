// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backing-store table naming
//!
//! ```text
//! slice_history                 one row per committed checkpoint
//! slice_order_<unix secs>       ┐
//! slice_market_<unix secs>      ├ one partition set per checkpoint attempt
//! slice_balance_<unix secs>     ┘
//! operlog_<YYYYMMDD>            one operation-log shard per local calendar day
//! ```

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Table holding checkpoint metadata
pub const SLICE_HISTORY_TABLE: &str = "slice_history";

/// One of the three independently stored snapshot partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Orders,
    Markets,
    Balances,
}

impl Partition {
    /// All partitions, in dump/load order
    pub const ALL: [Partition; 3] = [Partition::Orders, Partition::Markets, Partition::Balances];

    /// Table name prefix, without the timestamp suffix
    pub fn prefix(&self) -> &'static str {
        match self {
            Partition::Orders => "slice_order_",
            Partition::Markets => "slice_market_",
            Partition::Balances => "slice_balance_",
        }
    }

    /// Table holding this partition for the checkpoint taken at `timestamp`
    pub fn table(&self, timestamp: i64) -> String {
        format!("{}{}", self.prefix(), timestamp)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Partition::Orders => "orders",
            Partition::Markets => "markets",
            Partition::Balances => "balances",
        };
        f.write_str(name)
    }
}

/// Operation-log shard for a calendar day
pub fn operlog_table(date: NaiveDate) -> String {
    format!("operlog_{}", date.format("%Y%m%d"))
}

/// Local calendar day containing the unix timestamp
///
/// Falls back to the UTC day for timestamps the local zone cannot represent.
pub fn local_date(unix_secs: i64) -> NaiveDate {
    match Local.timestamp_opt(unix_secs, 0).earliest() {
        Some(t) => t.date_naive(),
        None => chrono::DateTime::from_timestamp(unix_secs, 0)
            .map(|t| t.date_naive())
            .unwrap_or_default(),
    }
}

/// Check a table name is a plain lowercase identifier
///
/// Table names are interpolated into SQL, so only `[a-z0-9_]` is accepted.
pub fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
