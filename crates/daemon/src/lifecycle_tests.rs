// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use me_storage::BackingStore;
use std::time::Duration;
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::defaults(dir.path());
    config.persist.checkpoint_interval = Duration::ZERO;
    config
}

const OPEN_MARKET: &str = r#"{"method":"open_market","name":"BTCUSD","stock":"BTC","money":"USD"}"#;
const DEPOSIT: &str = r#"{"method":"update_balance","user_id":1,"asset":"USD","change":250}"#;

#[test]
fn startup_on_empty_store_recovers_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    let (daemon, outcome) = startup(&config).unwrap();

    assert_eq!(outcome.cursor, 0);
    assert!(outcome.checkpoint.is_none());
    assert_eq!(daemon.book, BookState::new());
    assert!(config.lock_path.exists());
}

#[test]
fn second_instance_cannot_take_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let (_daemon, _) = startup(&config).unwrap();

    let err = startup(&config).err().unwrap();

    assert!(matches!(err, LifecycleError::LockFailed(_)));
    // the running instance keeps its lock file
    assert!(config.lock_path.exists());
}

#[test]
fn unreadable_store_fails_startup_and_releases_lock() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    std::fs::write(&config.store_path, b"not a sqlite database, just some bytes").unwrap();

    let err = startup(&config).err().unwrap();

    assert!(matches!(err, LifecycleError::Store(_)));
    assert!(!config.lock_path.exists());
}

#[test]
fn lines_are_logged_rejected_or_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let (mut daemon, _) = startup(&test_config(&dir)).unwrap();

    assert_eq!(daemon.handle_line("").unwrap(), None);
    assert_eq!(
        daemon.handle_line(OPEN_MARKET).unwrap(),
        Some(Reply::Logged { id: 1 })
    );
    assert!(matches!(
        daemon.handle_line(OPEN_MARKET).unwrap(),
        Some(Reply::Rejected { .. })
    ));
    assert!(matches!(
        daemon.handle_line("{oops").unwrap(),
        Some(Reply::Malformed { .. })
    ));
    assert_eq!(
        daemon.handle_line(DEPOSIT).unwrap(),
        Some(Reply::Logged { id: 2 })
    );
    assert_eq!(daemon.book.balance(1, "USD"), 250);
}

#[tokio::test]
async fn restart_recovers_from_checkpoint_and_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    {
        let (mut daemon, _) = startup(&config).unwrap();
        daemon.handle_line(OPEN_MARKET).unwrap();
        daemon.tick();
        daemon.handle_line(DEPOSIT).unwrap();
        daemon.shutdown().await;
    }
    assert!(!config.lock_path.exists());

    let (daemon, outcome) = startup(&config).unwrap();

    assert_eq!(outcome.checkpoint.map(|c| c.end_operation_id), Some(1));
    assert_eq!(outcome.cursor, 2);
    assert!(daemon.book.market("BTCUSD").is_some());
    assert_eq!(daemon.book.balance(1, "USD"), 250);

    let history = open_store(&config).unwrap().list_slices(10).unwrap();
    assert_eq!(history.len(), 1);
}
