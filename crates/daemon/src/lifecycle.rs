// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: paths, configuration, and the single-instance lock.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors during daemon startup.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine a state directory")]
    NoStateDir,
    #[error("another smigd instance holds the lock at {0}")]
    LockFailed(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon configuration, resolved from the environment with sensible
/// home-directory defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the lock file and log.
    pub state_dir: PathBuf,
    /// The controller's migration endpoint socket.
    pub socket_path: PathBuf,
    pub log_path: PathBuf,
    pub lock_path: PathBuf,
    /// Scheduler-parameters string handed to [`sm_core::MigrationConfig`].
    pub sched_params: String,
}

impl Config {
    /// Resolve the daemon configuration.
    ///
    /// `SMIG_STATE_DIR` overrides the state directory, `SMIG_CTLD_SOCKET`
    /// the controller endpoint, and `SMIG_SCHED_PARAMS` the tunables string.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = match std::env::var_os("SMIG_STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .ok_or(LifecycleError::NoStateDir)?
                .join("smig"),
        };

        let socket_path = match std::env::var_os("SMIG_CTLD_SOCKET") {
            Some(path) => PathBuf::from(path),
            None => state_dir.join("ctld.sock"),
        };

        let sched_params = std::env::var("SMIG_SCHED_PARAMS").unwrap_or_default();

        Ok(Self {
            socket_path,
            log_path: state_dir.join("smigd.log"),
            lock_path: state_dir.join("smigd.lock"),
            state_dir,
            sched_params,
        })
    }
}

/// Take the single-instance lock, writing our pid into it.
///
/// The lock is advisory and held for the process lifetime; dropping the
/// returned file releases it.
pub fn acquire_lock(path: &Path) -> Result<File, LifecycleError> {
    use fs2::FileExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    if file.try_lock_exclusive().is_err() {
        return Err(LifecycleError::LockFailed(path.to_path_buf()));
    }
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
