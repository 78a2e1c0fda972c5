// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations arriving as JSON lines on stdin, and the replies to them
//!
//! ```text
//! {"method":"update_balance","user_id":1,"asset":"USD","change":100}
//! {"status":"logged","id":601}
//! ```

use me_core::Operation;
use serde::Serialize;

/// Reply written to stdout for each non-blank input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    /// Applied and durably logged under `id`
    Logged { id: u64 },
    /// Valid operation the engine refused; nothing was logged
    Rejected { error: String },
    /// Line was not an operation
    Malformed { error: String },
}

/// Parse one input line; blank lines carry no operation
pub fn parse_operation(line: &str) -> Result<Option<Operation>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
