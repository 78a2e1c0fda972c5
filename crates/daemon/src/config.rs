// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file and path resolution

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use me_core::{ConfigError, PersistConfig};
use serde::Deserialize;

use crate::lifecycle::LifecycleError;

/// Store database file name inside the state directory
const STORE_FILE: &str = "matchengine.db";
/// Log file name inside the state directory
const LOG_FILE: &str = "med.log";

/// On-disk TOML layout; every field is optional
///
/// ```toml
/// [store]
/// path = "/var/lib/med/matchengine.db"
///
/// [log]
/// path = "/var/log/med.log"
///
/// [persist]
/// checkpoint_interval = "1h"
/// tick_interval = "60s"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    store: PathSection,
    log: PathSection,
    persist: PersistConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PathSection {
    path: Option<PathBuf>,
}

/// Resolved daemon configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database holding checkpoints and the operation log
    pub store_path: PathBuf,
    /// Exclusive lock file beside the store (single writer)
    pub lock_path: PathBuf,
    /// Daemon log file
    pub log_path: PathBuf,
    pub persist: PersistConfig,
}

impl Config {
    /// Load from `path`, or use defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| LifecycleError::ReadConfig(path.to_path_buf(), e))?;
                Self::from_toml(&content, &state_dir)
            }
            None => Ok(Self::defaults(&state_dir)),
        }
    }

    /// Parse a config document, filling unset paths from `state_dir`
    pub fn from_toml(content: &str, state_dir: &Path) -> Result<Self, LifecycleError> {
        let file: FileConfig = toml::from_str(content).map_err(ConfigError::from)?;
        file.persist.validate()?;

        let store_path = file.store.path.unwrap_or_else(|| state_dir.join(STORE_FILE));
        Ok(Self {
            lock_path: lock_path_for(&store_path),
            log_path: file.log.path.unwrap_or_else(|| state_dir.join(LOG_FILE)),
            store_path,
            persist: file.persist,
        })
    }

    pub fn defaults(state_dir: &Path) -> Self {
        let store_path = state_dir.join(STORE_FILE);
        Self {
            lock_path: lock_path_for(&store_path),
            log_path: state_dir.join(LOG_FILE),
            store_path,
            persist: PersistConfig::default(),
        }
    }
}

/// `<store>.lock`, so each store has exactly one writer
fn lock_path_for(store_path: &Path) -> PathBuf {
    let mut name = OsString::from(store_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Get the state directory for med
///
/// `MED_STATE_DIR` wins (used by tests), then `XDG_STATE_HOME/med`, then
/// `~/.local/state/med`.
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("MED_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("med"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/med"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
