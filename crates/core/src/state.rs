// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine state as seen by the persistence layer
//!
//! The matching engine owns its order book, market registry and balance
//! ledger. Persistence only needs three things from it: apply a logged
//! operation, dump a partition to opaque rows, and load a partition back.
//! [`BookState`] is a reference implementation that rests orders without
//! matching them.

use crate::operation::{Operation, Side};
use crate::table::Partition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Opaque snapshot row
pub type Row = serde_json::Value;

/// Errors applying a logged operation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("market already exists: {0}")]
    MarketExists(String),
    #[error("unknown market: {0}")]
    UnknownMarket(String),
    #[error("duplicate order id: {0}")]
    DuplicateOrder(u64),
    #[error("order {order_id} not found on market {market}")]
    UnknownOrder { market: String, order_id: u64 },
    #[error("insufficient {asset} balance for user {user_id}")]
    InsufficientBalance { user_id: u32, asset: String },
}

/// Errors moving state in or out of a snapshot partition
#[derive(Debug, Error)]
pub enum StateError {
    #[error("{partition} row encoding failed: {source}")]
    Encode {
        partition: Partition,
        #[source]
        source: serde_json::Error,
    },
    #[error("{partition} row decoding failed: {source}")]
    Decode {
        partition: Partition,
        #[source]
        source: serde_json::Error,
    },
    #[error("apply failed: {0}")]
    Apply(#[from] ApplyError),
}

/// Engine state that can be checkpointed and rebuilt from the operation log
///
/// `Clone` is the isolation mechanism: a checkpoint works on a copy taken at
/// the trigger instant and never touches the live value again.
pub trait EngineState: Clone + Send + Sync + 'static {
    /// Apply one logged operation
    fn apply(&mut self, op: &Operation) -> Result<(), ApplyError>;

    /// Serialize one partition to rows
    fn dump(&self, partition: Partition) -> Result<Vec<Row>, StateError>;

    /// Merge rows of one partition into the state
    fn load(&mut self, partition: Partition, rows: Vec<Row>) -> Result<(), StateError>;
}

/// A resting order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub market: String,
    pub user_id: u32,
    pub side: Side,
    pub price: u64,
    pub amount: u64,
}

/// A registered market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub name: String,
    pub stock: String,
    pub money: String,
}

/// Balance row as stored in `slice_balance_<ts>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: u32,
    pub asset: String,
    pub amount: i64,
}

/// Reference engine state: resting orders, markets and balances
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookState {
    orders: BTreeMap<u64, Order>,
    markets: BTreeMap<String, Market>,
    balances: BTreeMap<(u32, String), i64>,
}

impl BookState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self, id: u64) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn market(&self, name: &str) -> Option<&Market> {
        self.markets.get(name)
    }

    /// Balance of `asset` held by `user_id` (zero when absent)
    pub fn balance(&self, user_id: u32, asset: &str) -> i64 {
        self.balances
            .get(&(user_id, asset.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    pub fn balance_count(&self) -> usize {
        self.balances.len()
    }
}

impl EngineState for BookState {
    fn apply(&mut self, op: &Operation) -> Result<(), ApplyError> {
        match op {
            Operation::OpenMarket { name, stock, money } => {
                if self.markets.contains_key(name) {
                    return Err(ApplyError::MarketExists(name.clone()));
                }
                self.markets.insert(
                    name.clone(),
                    Market {
                        name: name.clone(),
                        stock: stock.clone(),
                        money: money.clone(),
                    },
                );
            }

            Operation::LimitOrder {
                order_id,
                market,
                user_id,
                side,
                price,
                amount,
            } => {
                if !self.markets.contains_key(market) {
                    return Err(ApplyError::UnknownMarket(market.clone()));
                }
                if self.orders.contains_key(order_id) {
                    return Err(ApplyError::DuplicateOrder(*order_id));
                }
                self.orders.insert(
                    *order_id,
                    Order {
                        id: *order_id,
                        market: market.clone(),
                        user_id: *user_id,
                        side: *side,
                        price: *price,
                        amount: *amount,
                    },
                );
            }

            Operation::CancelOrder { market, order_id } => {
                match self.orders.get(order_id) {
                    Some(order) if order.market == *market => {
                        self.orders.remove(order_id);
                    }
                    _ => {
                        return Err(ApplyError::UnknownOrder {
                            market: market.clone(),
                            order_id: *order_id,
                        })
                    }
                }
            }

            Operation::UpdateBalance {
                user_id,
                asset,
                change,
            } => {
                let key = (*user_id, asset.clone());
                let current = self.balances.get(&key).copied().unwrap_or(0);
                let updated = current
                    .checked_add(*change)
                    .filter(|amount| *amount >= 0)
                    .ok_or_else(|| ApplyError::InsufficientBalance {
                        user_id: *user_id,
                        asset: asset.clone(),
                    })?;
                self.balances.insert(key, updated);
            }
        }
        Ok(())
    }

    fn dump(&self, partition: Partition) -> Result<Vec<Row>, StateError> {
        let encode = |source| StateError::Encode { partition, source };
        match partition {
            Partition::Orders => self
                .orders
                .values()
                .map(|o| serde_json::to_value(o).map_err(encode))
                .collect(),
            Partition::Markets => self
                .markets
                .values()
                .map(|m| serde_json::to_value(m).map_err(encode))
                .collect(),
            Partition::Balances => self
                .balances
                .iter()
                .map(|((user_id, asset), amount)| {
                    serde_json::to_value(Balance {
                        user_id: *user_id,
                        asset: asset.clone(),
                        amount: *amount,
                    })
                    .map_err(encode)
                })
                .collect(),
        }
    }

    fn load(&mut self, partition: Partition, rows: Vec<Row>) -> Result<(), StateError> {
        let decode = |source| StateError::Decode { partition, source };
        for row in rows {
            match partition {
                Partition::Orders => {
                    let order: Order = serde_json::from_value(row).map_err(decode)?;
                    self.orders.insert(order.id, order);
                }
                Partition::Markets => {
                    let market: Market = serde_json::from_value(row).map_err(decode)?;
                    self.markets.insert(market.name.clone(), market);
                }
                Partition::Balances => {
                    let balance: Balance = serde_json::from_value(row).map_err(decode)?;
                    self.balances
                        .insert((balance.user_id, balance.asset), balance.amount);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
