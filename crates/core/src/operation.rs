// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation-log records
//!
//! Every state-changing request the engine accepts is recorded as an
//! [`Operation`] in the day's `operlog_<YYYYMMDD>` shard. Replaying the log
//! on top of the latest checkpoint reconstructs the engine state.

use serde::{Deserialize, Serialize};

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Ask,
    Bid,
}

/// State-changing operations recorded in the operation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Operation {
    /// Register a market
    OpenMarket {
        name: String,
        stock: String,
        money: String,
    },

    /// Rest a limit order on a market
    LimitOrder {
        order_id: u64,
        market: String,
        user_id: u32,
        side: Side,
        price: u64,
        amount: u64,
    },

    /// Remove a resting order
    CancelOrder { market: String, order_id: u64 },

    /// Credit or debit a user's balance (minor units)
    UpdateBalance {
        user_id: u32,
        asset: String,
        change: i64,
    },
}

impl Operation {
    /// Method name as stored in the log
    pub fn method(&self) -> &'static str {
        match self {
            Operation::OpenMarket { .. } => "open_market",
            Operation::LimitOrder { .. } => "limit_order",
            Operation::CancelOrder { .. } => "cancel_order",
            Operation::UpdateBalance { .. } => "update_balance",
        }
    }
}

/// One entry of a day-sharded operation log
///
/// Ids are globally monotonic across shard boundaries; replay carries a
/// single cursor from one day's shard into the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub id: u64,
    /// Time the operation was recorded (unix seconds)
    pub time: i64,
    pub detail: Operation,
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
