// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::ReplayError;
use me_core::{operlog_table, BookState, FakeClock, Operation, OperationLogEntry, Side};
use me_storage::{FakeStore, StoreCall, StoreError};

const T: i64 = 1_700_000_000;
const DAY: i64 = 86_400;

fn entry(id: u64, detail: Operation) -> OperationLogEntry {
    OperationLogEntry {
        id,
        time: T,
        detail,
    }
}

fn deposit(id: u64) -> OperationLogEntry {
    entry(
        id,
        Operation::UpdateBalance {
            user_id: 1,
            asset: "USD".to_string(),
            change: 1,
        },
    )
}

/// State captured by the checkpoint at `T`
fn checkpointed_state() -> BookState {
    let mut state = BookState::new();
    state
        .apply(&Operation::OpenMarket {
            name: "BTCUSD".to_string(),
            stock: "BTC".to_string(),
            money: "USD".to_string(),
        })
        .unwrap();
    state
        .apply(&Operation::UpdateBalance {
            user_id: 1,
            asset: "USD".to_string(),
            change: 1_000,
        })
        .unwrap();
    state
}

fn seed_checkpoint(store: &FakeStore, state: &BookState, timestamp: i64, end_id: u64) {
    for partition in Partition::ALL {
        store.seed_partition(&partition.table(timestamp), state.dump(partition).unwrap());
    }
    store.insert_slice(timestamp, end_id).unwrap();
}

/// Checkpoint `(T, 500)`, day(T) holding 501..=520, "today" (T + 3 days)
/// holding 521..=600, and no shards for the two days in between.
fn recovery_fixture() -> (FakeStore, FakeClock) {
    let store = FakeStore::new();
    seed_checkpoint(&store, &checkpointed_state(), T, 500);

    let mut first_day = vec![
        entry(
            501,
            Operation::OpenMarket {
                name: "ETHUSD".to_string(),
                stock: "ETH".to_string(),
                money: "USD".to_string(),
            },
        ),
        entry(
            502,
            Operation::LimitOrder {
                order_id: 1,
                market: "ETHUSD".to_string(),
                user_id: 1,
                side: Side::Ask,
                price: 2_000,
                amount: 3,
            },
        ),
    ];
    first_day.extend((503..=520).map(deposit));
    // entries at or below the checkpoint cursor must be skipped
    first_day.push(deposit(499));
    first_day.push(deposit(500));
    store.seed_operlog(&operlog_table(local_date(T)), first_day);
    store.seed_operlog(
        &operlog_table(local_date(T + 3 * DAY)),
        (521..=600).map(deposit),
    );
    store.clear_calls();

    (store, FakeClock::at(T + 3 * DAY))
}

#[test]
fn recovery_applies_snapshot_plus_log_once_in_order() {
    let (store, clock) = recovery_fixture();

    let (state, outcome): (BookState, _) =
        RecoveryCoordinator::new(store, clock).recover().unwrap();

    assert_eq!(outcome.cursor, 600);
    assert_eq!(outcome.applied, 100);
    assert_eq!(outcome.checkpoint.map(|c| c.end_operation_id), Some(500));
    assert!(state.market("BTCUSD").is_some());
    assert!(state.market("ETHUSD").is_some());
    assert!(state.order(1).is_some());
    // 1000 from the snapshot, one per deposit 503..=600
    assert_eq!(state.balance(1, "USD"), 1_000 + 98);
}

#[test]
fn recovery_tolerates_missing_days() {
    let (store, clock) = recovery_fixture();

    let (_, outcome): (BookState, _) = RecoveryCoordinator::new(store, clock).recover().unwrap();

    assert_eq!(outcome.shards_replayed, 2);
    assert_eq!(outcome.shards_missing, 2);
}

#[test]
fn recovery_walks_days_in_calendar_order() {
    let (store, clock) = recovery_fixture();

    let _: (BookState, _) = RecoveryCoordinator::new(store.clone(), clock)
        .recover()
        .unwrap();

    let checked: Vec<String> = store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            StoreCall::TableExists { table } => Some(table),
            _ => None,
        })
        .collect();
    let expected: Vec<String> = (0..=3)
        .map(|d| operlog_table(local_date(T + d * DAY)))
        .collect();
    assert_eq!(checked, expected);
}

#[test]
fn recovery_carries_cursor_across_days() {
    let (store, clock) = recovery_fixture();

    let _: (BookState, _) = RecoveryCoordinator::new(store.clone(), clock)
        .recover()
        .unwrap();

    let cursors: Vec<u64> = store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            StoreCall::ReadOperlog { after_id, .. } => Some(after_id),
            _ => None,
        })
        .collect();
    assert_eq!(cursors, vec![500, 520]);
}

#[test]
fn empty_history_replays_only_today_from_zero() {
    let store = FakeStore::new();
    let now = T + 10 * DAY;
    store.seed_operlog(&operlog_table(local_date(now - DAY)), (1..=5).map(deposit));
    store.seed_operlog(&operlog_table(local_date(now)), (6..=8).map(deposit));
    store.clear_calls();

    let (state, outcome): (BookState, _) =
        RecoveryCoordinator::new(store.clone(), FakeClock::at(now))
            .recover()
            .unwrap();

    assert_eq!(outcome.checkpoint, None);
    assert_eq!(outcome.cursor, 8);
    assert_eq!(state.balance(1, "USD"), 3);
    let calls = store.calls();
    assert!(!calls
        .iter()
        .any(|c| matches!(c, StoreCall::ReadPartition { .. })));
    assert!(calls.contains(&StoreCall::ReadOperlog {
        table: operlog_table(local_date(now)),
        after_id: 0,
    }));
}

#[test]
fn empty_history_and_no_shard_starts_empty() {
    let (state, outcome): (BookState, _) =
        RecoveryCoordinator::new(FakeStore::new(), FakeClock::at(T))
            .recover()
            .unwrap();

    assert_eq!(state, BookState::new());
    assert_eq!(outcome.cursor, 0);
    assert_eq!(outcome.shards_missing, 1);
}

#[test]
fn missing_snapshot_partition_is_fatal() {
    let store = FakeStore::new();
    let state = checkpointed_state();
    store.seed_partition(
        &Partition::Orders.table(T),
        state.dump(Partition::Orders).unwrap(),
    );
    store.seed_partition(
        &Partition::Markets.table(T),
        state.dump(Partition::Markets).unwrap(),
    );
    store.insert_slice(T, 500).unwrap();

    let err = RecoveryCoordinator::new(store, FakeClock::at(T))
        .recover::<BookState>()
        .unwrap_err();

    match err {
        RecoveryError::SnapshotLoad { table, source } => {
            assert_eq!(table, format!("slice_balance_{}", T));
            assert!(matches!(source, StoreError::TableNotFound(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn corrupt_snapshot_partition_is_fatal() {
    let store = FakeStore::new();
    seed_checkpoint(&store, &checkpointed_state(), T, 500);
    store.seed_partition(
        &Partition::Markets.table(T),
        vec![serde_json::json!({"bogus": true})],
    );

    let err = RecoveryCoordinator::new(store, FakeClock::at(T))
        .recover::<BookState>()
        .unwrap_err();
    assert!(matches!(err, RecoveryError::SnapshotDecode { .. }));
}

#[test]
fn unreachable_store_is_fatal() {
    let store = FakeStore::new();
    store.set_unreachable(true);

    let err = RecoveryCoordinator::new(store, FakeClock::at(T))
        .recover::<BookState>()
        .unwrap_err();
    assert!(matches!(
        err,
        RecoveryError::History(StoreError::Connection { .. })
    ));
}

#[test]
fn unreadable_shard_is_fatal() {
    let (store, clock) = recovery_fixture();
    store.fail_tables(&operlog_table(local_date(T + 3 * DAY)));

    let err = RecoveryCoordinator::new(store, clock)
        .recover::<BookState>()
        .unwrap_err();
    assert!(matches!(err, RecoveryError::Replay(ReplayError::Store { .. })));
}

#[test]
fn recovery_uses_only_the_latest_checkpoint() {
    let store = FakeStore::new();
    let older = BookState::new();
    seed_checkpoint(&store, &older, T - DAY, 100);
    seed_checkpoint(&store, &checkpointed_state(), T, 500);

    let (state, outcome): (BookState, _) =
        RecoveryCoordinator::new(store, FakeClock::at(T)).recover().unwrap();

    assert_eq!(outcome.checkpoint.map(|c| c.timestamp), Some(T));
    assert_eq!(outcome.cursor, 500);
    assert_eq!(state, checkpointed_state());
}
