// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint-runtime glue for task launch.
//!
//! When a task of a checkpoint-enabled job starts, its command line is
//! wrapped with the checkpoint launcher and the job's tasks rendezvous on a
//! shared coordinator daemon. The rendezvous protocol is deliberately dumb:
//!
//! - `<ckpt_root>/<job_id>/` is created with an exclusive `create_dir`; the
//!   one task that succeeds becomes the coordinator host.
//! - The creator launches the coordinator (argv spawn, no shell), retrying
//!   on the next port after a failed launch, bounded by
//!   `max_coordinators_per_host` attempts.
//! - The chosen endpoint is advertised in the `dmtcp_coordinator` file:
//!   ASCII `key=value` lines, one per line. Other tasks read it.
//! - The file is removed on task exit.

use crate::subprocess::{run_with_timeout, COORDINATOR_TIMEOUT};
use async_trait::async_trait;
use sm_core::JobId;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Rendezvous file name inside a job's checkpoint directory.
pub const RENDEZVOUS_FILE: &str = "dmtcp_coordinator";

/// Errors from the checkpoint glue.
#[derive(Debug, Error)]
pub enum DmtcpError {
    #[error("could not start a coordinator after {0} attempts")]
    CoordinatorExhausted(u32),
    #[error("malformed rendezvous file: {0}")]
    MalformedRendezvous(String),
    #[error("malformed environment entry: {0}")]
    MalformedEnvEntry(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coordinator endpoint advertised to the tasks of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendezvous {
    pub host: String,
    pub port: u16,
}

impl Rendezvous {
    /// Render the on-disk form: `key=value` lines, ASCII, one per line.
    pub fn render(&self) -> String {
        format!("DMTCP_COORDINATOR={}\nDMTCP_PORT={}\n", self.host, self.port)
    }

    /// Parse the on-disk form.
    pub fn parse(contents: &str) -> Result<Self, DmtcpError> {
        let mut host = None;
        let mut port = None;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once('=') {
                Some(("DMTCP_COORDINATOR", value)) => host = Some(value.to_string()),
                Some(("DMTCP_PORT", value)) => {
                    port = value.parse::<u16>().ok();
                    if port.is_none() {
                        return Err(DmtcpError::MalformedRendezvous(line.to_string()));
                    }
                }
                _ => return Err(DmtcpError::MalformedRendezvous(line.to_string())),
            }
        }
        match (host, port) {
            (Some(host), Some(port)) => Ok(Self { host, port }),
            _ => Err(DmtcpError::MalformedRendezvous(
                "missing DMTCP_COORDINATOR or DMTCP_PORT".into(),
            )),
        }
    }
}

/// Launches coordinator daemons. Production uses [`ProcessSpawner`]; tests
/// script port availability through a fake.
#[async_trait]
pub trait CoordinatorSpawner: Send + Sync {
    /// Try to start a coordinator for `ckpt_dir` on `port`.
    ///
    /// `Ok(true)` means the daemon accepted the port; `Ok(false)` means the
    /// launch failed (typically port in use) and the caller should retry on
    /// another port.
    async fn spawn(&self, ckpt_dir: &Path, port: u16) -> std::io::Result<bool>;
}

/// Spawns the real coordinator binary with structured argv (no shell).
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    coordinator_bin: PathBuf,
}

impl Default for ProcessSpawner {
    fn default() -> Self {
        Self {
            coordinator_bin: PathBuf::from("dmtcp_coordinator"),
        }
    }
}

impl ProcessSpawner {
    pub fn new(coordinator_bin: impl Into<PathBuf>) -> Self {
        Self {
            coordinator_bin: coordinator_bin.into(),
        }
    }
}

#[async_trait]
impl CoordinatorSpawner for ProcessSpawner {
    async fn spawn(&self, ckpt_dir: &Path, port: u16) -> std::io::Result<bool> {
        let mut cmd = Command::new(&self.coordinator_bin);
        cmd.arg("--exit-on-last")
            .arg("--daemon")
            .arg("--ckptdir")
            .arg(ckpt_dir)
            .arg("-p")
            .arg(port.to_string());

        let output = run_with_timeout(cmd, COORDINATOR_TIMEOUT, "coordinator launch")
            .await
            .map_err(std::io::Error::other)?;
        Ok(output.status.success())
    }
}

/// Prepend the checkpoint launcher to a task's argument vector.
pub fn wrap_argv(launcher: &Path, argv: &[String]) -> Vec<String> {
    let mut wrapped = Vec::with_capacity(argv.len() + 1);
    wrapped.push(launcher.display().to_string());
    wrapped.extend(argv.iter().cloned());
    wrapped
}

/// Per-job checkpoint directory.
pub fn job_checkpoint_dir(root: &Path, job_id: JobId) -> PathBuf {
    root.join(job_id.to_string())
}

/// Set up the rendezvous for one task of `job_id`.
///
/// The first task to create the checkpoint directory launches a coordinator
/// and writes the rendezvous file; every other task reads it. Returns
/// `Ok(None)` for a non-creator that raced ahead of the creator's write.
pub async fn init_task_rendezvous(
    spawner: &dyn CoordinatorSpawner,
    root: &Path,
    job_id: JobId,
    host: &str,
    base_port: u16,
    max_attempts: u32,
) -> Result<Option<Rendezvous>, DmtcpError> {
    let dir = job_checkpoint_dir(root, job_id);
    match std::fs::create_dir(&dir) {
        Ok(()) => {
            let rendezvous =
                launch_coordinator(spawner, &dir, host, base_port, max_attempts).await?;
            std::fs::write(dir.join(RENDEZVOUS_FILE), rendezvous.render())?;
            debug!(%job_id, host = rendezvous.host, port = rendezvous.port, "coordinator ready");
            Ok(Some(rendezvous))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => read_rendezvous(root, job_id),
        Err(e) => Err(e.into()),
    }
}

/// Start a coordinator, walking forward from `base_port` until a launch
/// succeeds or the attempt budget runs out.
async fn launch_coordinator(
    spawner: &dyn CoordinatorSpawner,
    ckpt_dir: &Path,
    host: &str,
    base_port: u16,
    max_attempts: u32,
) -> Result<Rendezvous, DmtcpError> {
    let mut port = base_port;
    for attempt in 0..max_attempts {
        if spawner.spawn(ckpt_dir, port).await? {
            return Ok(Rendezvous {
                host: host.to_string(),
                port,
            });
        }
        warn!(port, attempt, "coordinator launch failed, trying next port");
        port = port.wrapping_add(1);
    }
    Err(DmtcpError::CoordinatorExhausted(max_attempts))
}

/// Read the rendezvous file for `job_id`, if it has been written yet.
pub fn read_rendezvous(root: &Path, job_id: JobId) -> Result<Option<Rendezvous>, DmtcpError> {
    let path = job_checkpoint_dir(root, job_id).join(RENDEZVOUS_FILE);
    match std::fs::read_to_string(&path) {
        Ok(contents) => Rendezvous::parse(&contents).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove the rendezvous file on task exit. Missing files are fine; the
/// checkpoint images themselves are left for the restart path.
pub fn remove_rendezvous(root: &Path, job_id: JobId) -> std::io::Result<()> {
    let path = job_checkpoint_dir(root, job_id).join(RENDEZVOUS_FILE);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Parse a comma-separated `KEY=VALUE,...` option argument into environment
/// pairs to export into the task before launch.
pub fn parse_env_exports(arg: &str) -> Result<Vec<(String, String)>, DmtcpError> {
    let mut pairs = Vec::new();
    for entry in arg.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                pairs.push((key.to_string(), value.to_string()));
            }
            _ => return Err(DmtcpError::MalformedEnvEntry(entry.to_string())),
        }
    }
    Ok(pairs)
}

#[cfg(test)]
#[path = "dmtcp_tests.rs"]
mod tests;
