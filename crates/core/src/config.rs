// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration tunables.
//!
//! Parsed from the controller's scheduler-parameters string, a
//! comma-separated `key=value` list. Invalid values are logged and replaced
//! with the default for that key, never propagated as errors: a bad
//! parameter must not take the agent down.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

/// Seconds between agent ticks.
const DEFAULT_INTERVAL_SECS: u64 = 30;
/// Short sleep after a skipped tick.
const DEFAULT_SHORT_SLEEP_SECS: u64 = 1;
/// Interval between job-state polls in the driver's wait states.
const DEFAULT_POLL_SECS: u64 = 1;
/// Ceiling on each driver wait state before it gives up.
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 600;
/// Coordinator launch attempts per host before giving up.
const DEFAULT_MAX_COORDINATORS: u32 = 16;
/// Default checkpoint coordinator port.
const DEFAULT_COORDINATOR_PORT: u16 = 7779;
/// Default checkpoint directory root.
const DEFAULT_CHECKPOINT_ROOT: &str = "/var/spool/checkpoint";

/// Tunables for the migration agent and driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Agent tick cadence.
    pub interval: Duration,
    /// Sleep after a tick that skipped work.
    pub short_sleep: Duration,
    /// Skip the tick when the controller's RPC backlog reaches this count;
    /// zero disables the check.
    pub defer_rpc_cnt: u32,
    /// Job-state poll cadence in the driver's wait states.
    pub state_poll: Duration,
    /// Deadline for each driver wait state.
    pub wait_timeout: Duration,
    /// Root under which per-job checkpoint directories are created.
    pub checkpoint_root: PathBuf,
    /// Bound on coordinator launch attempts per host.
    pub max_coordinators_per_host: u32,
    /// Default coordinator port when the environment does not override it.
    pub coordinator_port: u16,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            short_sleep: Duration::from_secs(DEFAULT_SHORT_SLEEP_SECS),
            defer_rpc_cnt: 0,
            state_poll: Duration::from_secs(DEFAULT_POLL_SECS),
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            checkpoint_root: PathBuf::from(DEFAULT_CHECKPOINT_ROOT),
            max_coordinators_per_host: DEFAULT_MAX_COORDINATORS,
            coordinator_port: DEFAULT_COORDINATOR_PORT,
        }
    }
}

impl MigrationConfig {
    /// Parse a scheduler-parameters string.
    ///
    /// Recognized keys: `migration_interval`, `max_rpc_cnt`,
    /// `migration_poll`, `migration_timeout`, `ckpt_dir`,
    /// `max_coordinators`, `coordinator_port`. Unknown keys are ignored so
    /// the string can be shared with other scheduler components.
    pub fn from_params(params: &str) -> Self {
        let mut config = Self::default();
        for entry in params.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let Some((key, value)) = entry.split_once('=') else {
                continue;
            };
            match key {
                "migration_interval" => {
                    config.interval = parse_secs(key, value, 1)
                        .unwrap_or(Duration::from_secs(DEFAULT_INTERVAL_SECS));
                }
                "max_rpc_cnt" => {
                    config.defer_rpc_cnt = parse_u32(key, value).unwrap_or(0);
                }
                "migration_poll" => {
                    config.state_poll = parse_secs(key, value, 1)
                        .unwrap_or(Duration::from_secs(DEFAULT_POLL_SECS));
                }
                "migration_timeout" => {
                    config.wait_timeout = parse_secs(key, value, 1)
                        .unwrap_or(Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS));
                }
                "ckpt_dir" => {
                    config.checkpoint_root = PathBuf::from(value);
                }
                "max_coordinators" => {
                    config.max_coordinators_per_host =
                        parse_u32(key, value).unwrap_or(DEFAULT_MAX_COORDINATORS);
                }
                "coordinator_port" => match value.parse::<u16>() {
                    Ok(port) if port > 0 => config.coordinator_port = port,
                    _ => {
                        error!(key, value, "invalid scheduler parameter");
                        config.coordinator_port = DEFAULT_COORDINATOR_PORT;
                    }
                },
                _ => {}
            }
        }
        config
    }
}

fn parse_secs(key: &str, value: &str, min: u64) -> Option<Duration> {
    match value.parse::<u64>() {
        Ok(secs) if secs >= min => Some(Duration::from_secs(secs)),
        _ => {
            error!(key, value, "invalid scheduler parameter");
            None
        }
    }
}

fn parse_u32(key: &str, value: &str) -> Option<u32> {
    match value.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            error!(key, value, "invalid scheduler parameter");
            None
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
