// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    empty = { "" },
    spaces = { "   " },
    newline = { "\n" },
)]
fn blank_lines_carry_no_operation(line: &str) {
    assert!(parse_operation(line).unwrap().is_none());
}

#[test]
fn parses_tagged_operation() {
    let op = parse_operation(r#" {"method":"cancel_order","market":"BTCUSD","order_id":4} "#)
        .unwrap()
        .unwrap();

    assert_eq!(
        op,
        Operation::CancelOrder {
            market: "BTCUSD".to_string(),
            order_id: 4
        }
    );
}

#[parameterized(
    not_json = { "hello" },
    unknown_method = { r#"{"method":"withdraw_all"}"# },
    missing_field = { r#"{"method":"open_market","name":"BTCUSD"}"# },
)]
fn malformed_lines_are_errors(line: &str) {
    assert!(parse_operation(line).is_err());
}

#[test]
fn replies_serialize_with_status_tag() {
    let logged = serde_json::to_string(&Reply::Logged { id: 7 }).unwrap();
    let rejected = serde_json::to_string(&Reply::Rejected {
        error: "unknown market".to_string(),
    })
    .unwrap();

    assert_eq!(logged, r#"{"status":"logged","id":7}"#);
    assert_eq!(rejected, r#"{"status":"rejected","error":"unknown market"}"#);
}
