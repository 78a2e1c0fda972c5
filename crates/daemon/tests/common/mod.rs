// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for med integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::time::Duration;

use assert_cmd::Command;
use tempfile::TempDir;

pub const OPEN_MARKET: &str =
    r#"{"method":"open_market","name":"BTCUSD","stock":"BTC","money":"USD"}"#;
pub const DEPOSIT: &str = r#"{"method":"update_balance","user_id":1,"asset":"USD","change":100}"#;
pub const LIMIT_ORDER: &str = r#"{"method":"limit_order","order_id":1,"market":"BTCUSD","user_id":1,"side":"bid","price":30000,"amount":2}"#;

/// Isolated state directory with an optional config file
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// `med` pointed at this environment's state directory
    pub fn med(&self) -> Command {
        let mut cmd = Command::cargo_bin("med").expect("med binary");
        cmd.env("MED_STATE_DIR", self.dir.path())
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write a config file and return its path
    pub fn config(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("med.toml");
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }

    pub fn log(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("med.log")).unwrap_or_default()
    }

    /// Start `med run` with piped stdin, feed `lines`, keep stdin open for
    /// `linger`, then close it and wait for exit
    pub fn run_lingering(&self, config: &Path, lines: &[&str], linger: Duration) -> String {
        let mut child: Child = std::process::Command::new(assert_cmd::cargo::cargo_bin("med"))
            .env("MED_STATE_DIR", self.dir.path())
            .arg("--config")
            .arg(config)
            .arg("run")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .expect("Failed to spawn med");

        {
            let mut stdin = child.stdin.take().expect("stdin");
            for line in lines {
                writeln!(stdin, "{}", line).expect("Failed to write stdin");
            }
            stdin.flush().expect("Failed to flush stdin");
            std::thread::sleep(linger);
        }

        let output = child.wait_with_output().expect("Failed to wait for med");
        assert!(output.status.success(), "med run failed: {:?}", output);
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}
