// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use me_core::{BookState, FakeClock};
use me_storage::{FakeStore, StoreCall};
use std::time::Duration;

const T: i64 = 1_700_000_000;

fn deposit() -> Operation {
    Operation::UpdateBalance {
        user_id: 1,
        asset: "USD".to_string(),
        change: 10,
    }
}

#[test]
fn append_numbers_after_recovered_cursor() {
    let store = FakeStore::new();
    let writer = OperlogWriter::new(store.clone(), FakeClock::at(T));
    let mut ctx = PersistContext::recovered(T, 600);

    let first = writer.append(&mut ctx, deposit()).unwrap();
    let second = writer.append(&mut ctx, deposit()).unwrap();

    assert_eq!((first.id, second.id), (601, 602));
    assert_eq!(first.time, T);
    assert_eq!(ctx.last_operation_id(), 602);
    assert_eq!(ctx.operlog_id_start(), 600);
}

#[test]
fn append_writes_to_todays_shard() {
    let store = FakeStore::new();
    let clock = FakeClock::at(T);
    let writer = OperlogWriter::new(store.clone(), clock.clone());
    let mut ctx = PersistContext::recovered(0, 0);

    writer.append(&mut ctx, deposit()).unwrap();
    clock.advance(Duration::from_secs(86_400));
    writer.append(&mut ctx, deposit()).unwrap();

    assert_eq!(
        store.calls(),
        vec![
            StoreCall::AppendOperlog {
                table: operlog_table(local_date(T)),
                id: 1
            },
            StoreCall::AppendOperlog {
                table: operlog_table(local_date(T + 86_400)),
                id: 2
            },
        ]
    );
}

#[test]
fn failed_append_does_not_consume_id() {
    let store = FakeStore::new();
    let writer = OperlogWriter::new(store.clone(), FakeClock::at(T));
    let mut ctx = PersistContext::recovered(0, 5);

    store.fail_tables("operlog_");
    assert!(writer.append(&mut ctx, deposit()).is_err());
    assert_eq!(ctx.last_operation_id(), 5);

    store.clear_failures();
    assert_eq!(writer.append(&mut ctx, deposit()).unwrap().id, 6);
}

#[test]
fn logged_operations_replay_into_same_state() {
    use crate::recovery::RecoveryCoordinator;
    use me_core::EngineState;

    let store = FakeStore::new();
    let clock = FakeClock::at(T);
    let writer = OperlogWriter::new(store.clone(), clock.clone());
    let mut ctx = PersistContext::recovered(0, 0);
    let mut live = BookState::new();
    for _ in 0..3 {
        let op = deposit();
        live.apply(&op).unwrap();
        writer.append(&mut ctx, op).unwrap();
    }

    let (recovered, outcome): (BookState, _) =
        RecoveryCoordinator::new(store, clock).recover().unwrap();

    assert_eq!(recovered, live);
    assert_eq!(outcome.cursor, 3);
}
