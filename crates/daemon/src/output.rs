// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for the `recover` and `history` commands

use std::fmt;

use clap::ValueEnum;
use me_core::SliceHistoryEntry;
use me_persist::RecoveryOutcome;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + fmt::Display>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}

/// One `slice_history` row
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct HistoryRow(pub SliceHistoryEntry);

impl fmt::Display for HistoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6}  time={}  end_id={}",
            self.0.id, self.0.timestamp, self.0.end_operation_id
        )
    }
}

/// What a recovery run found
#[derive(Debug, Serialize)]
pub struct RecoverySummary {
    pub checkpoint: Option<SliceHistoryEntry>,
    pub operlog_id_start: u64,
    pub applied: usize,
    pub shards_replayed: usize,
    pub shards_missing: usize,
    pub markets: usize,
    pub orders: usize,
    pub balances: usize,
}

impl RecoverySummary {
    pub fn new(outcome: &RecoveryOutcome, book: &me_core::BookState) -> Self {
        Self {
            checkpoint: outcome.checkpoint,
            operlog_id_start: outcome.cursor,
            applied: outcome.applied,
            shards_replayed: outcome.shards_replayed,
            shards_missing: outcome.shards_missing,
            markets: book.market_count(),
            orders: book.order_count(),
            balances: book.balance_count(),
        }
    }
}

impl fmt::Display for RecoverySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.checkpoint {
            Some(c) => writeln!(
                f,
                "checkpoint: id={} time={} end_id={}",
                c.id, c.timestamp, c.end_operation_id
            )?,
            None => writeln!(f, "checkpoint: none")?,
        }
        writeln!(f, "operlog_id_start: {}", self.operlog_id_start)?;
        writeln!(
            f,
            "replayed: {} operations from {} shards ({} days without a shard)",
            self.applied, self.shards_replayed, self.shards_missing
        )?;
        write!(
            f,
            "state: {} markets, {} orders, {} balances",
            self.markets, self.orders, self.balances
        )
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
