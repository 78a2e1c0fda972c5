// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use me_core::Operation;
use serde_json::json;

fn entry(id: u64) -> OperationLogEntry {
    OperationLogEntry {
        id,
        time: 0,
        detail: Operation::CancelOrder {
            market: "BTCUSD".to_string(),
            order_id: id,
        },
    }
}

#[test]
fn fake_records_calls_in_order() {
    let store = FakeStore::new();
    store.write_partition("slice_order_1", &[json!(1)]).unwrap();
    store.insert_slice(1, 9).unwrap();

    assert_eq!(
        store.calls(),
        vec![
            StoreCall::WritePartition {
                table: "slice_order_1".to_string(),
                rows: 1,
            },
            StoreCall::InsertSlice {
                timestamp: 1,
                end_operation_id: 9,
            },
        ]
    );
}

#[test]
fn fake_injected_failure_matches_prefix_only() {
    let store = FakeStore::new();
    store.fail_tables("slice_market_");

    assert!(store.write_partition("slice_order_1", &[]).is_ok());
    assert!(matches!(
        store.write_partition("slice_market_1", &[]),
        Err(StoreError::Unavailable(_))
    ));
    assert!(store.partition("slice_market_1").is_none());

    store.clear_failures();
    assert!(store.write_partition("slice_market_1", &[]).is_ok());
}

#[test]
fn fake_unreachable_fails_everything() {
    let store = FakeStore::new();
    store.set_unreachable(true);
    assert!(matches!(
        store.latest_slice(),
        Err(StoreError::Connection { .. })
    ));
    assert!(matches!(
        store.table_exists("operlog_20231114"),
        Err(StoreError::Connection { .. })
    ));
}

#[test]
fn fake_operlog_reads_after_cursor() {
    let store = FakeStore::new();
    store.seed_operlog("operlog_20231114", (1..=5).map(entry));

    let ids: Vec<u64> = store
        .read_operlog("operlog_20231114", 3)
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![4, 5]);
}

#[test]
fn fake_latest_slice_is_max_id() {
    let store = FakeStore::new();
    store.insert_slice(10, 1).unwrap();
    let last = store.insert_slice(5, 2).unwrap();
    assert_eq!(store.latest_slice().unwrap(), Some(last));
    assert_eq!(store.list_slices(5).unwrap().len(), 2);
}
