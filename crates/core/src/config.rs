// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field} must be at least one second")]
    TooShort { field: &'static str },
}

/// Checkpoint scheduling settings
///
/// ```toml
/// checkpoint_interval = "1h"
/// tick_interval = "60s"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersistConfig {
    /// Minimum time between checkpoint triggers
    #[serde(with = "humantime_serde")]
    pub checkpoint_interval: Duration,
    /// How often the scheduler checks whether a checkpoint is due
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: Duration::from_secs(3600),
            tick_interval: Duration::from_secs(60),
        }
    }
}

impl PersistConfig {
    /// Parse from a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the scheduler cannot honor
    ///
    /// A zero checkpoint interval is allowed (checkpoint on every tick); a
    /// zero tick is not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval < Duration::from_secs(1) {
            return Err(ConfigError::TooShort {
                field: "tick_interval",
            });
        }
        Ok(())
    }

    /// Checkpoint interval in whole seconds, as compared against unix timestamps
    pub fn checkpoint_interval_secs(&self) -> i64 {
        i64::try_from(self.checkpoint_interval.as_secs()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
