// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic migration agent.
//!
//! A single long-lived task that wakes every `interval` seconds and may
//! dispatch one detached worker per tick. The worker runs the policy pass
//! (compaction, then priority promotion) and at most one migration.
//!
//! Arbitration rules:
//! - The composite scheduler lock is held only while the tick inspects the
//!   cluster and claims the `migration_active` flag, never across the
//!   worker's lifetime.
//! - `migration_active` gates overlapping workers; it is owned by an RAII
//!   guard so every worker exit path (including panics) releases it.
//! - The policy pass runs under a deadline of one interval. A migration
//!   already dispatched by the driver is never cancelled.

use parking_lot::Mutex;
use sm_adapters::{Controller, ControllerActivity};
use sm_core::{
    diag, ActiveTickGuard, JobInfo, JobState, MigrateRequest, MigrationConfig, SharedDiag,
};
use sm_engine::{select_compaction_candidate, select_promotion_candidate, MigrationDriver};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Loads the scheduler-parameters string on reconfiguration.
pub type ParamsLoader = Arc<dyn Fn() -> String + Send + Sync>;

/// What one tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// A worker task was dispatched.
    Dispatched(JoinHandle<()>),
    /// The tick skipped work; the reason feeds the short-sleep path.
    Skipped(&'static str),
}

/// The periodic migration agent.
pub struct MigrationAgent<C: Controller> {
    controller: Arc<C>,
    config: Mutex<MigrationConfig>,
    params_loader: ParamsLoader,
    /// Models the controller's composite lock (read config and partitions,
    /// write jobs and nodes). Held only for the in-tick critical section.
    scheduler_lock: Arc<RwLock<()>>,
    diag: SharedDiag,
    shutdown: Arc<Notify>,
    /// Epoch seconds of the last tick that dispatched a worker.
    last_success: Mutex<u64>,
}

impl<C: Controller> MigrationAgent<C> {
    pub fn new(
        controller: Arc<C>,
        config: MigrationConfig,
        params_loader: ParamsLoader,
        diag: SharedDiag,
        shutdown: Arc<Notify>,
    ) -> Self {
        Self {
            controller,
            config: Mutex::new(config),
            params_loader,
            scheduler_lock: Arc::new(RwLock::new(())),
            diag,
            shutdown,
            last_success: Mutex::new(0),
        }
    }

    /// Run the agent until the shutdown signal fires.
    pub async fn run(&self) {
        info!("migration agent started");
        let mut short_sleep = false;
        loop {
            let sleep_for = {
                let config = self.config.lock();
                if short_sleep {
                    config.short_sleep
                } else {
                    config.interval
                }
            };
            tokio::select! {
                _ = self.shutdown.notified() => break,
                _ = tokio::time::sleep(sleep_for) => {}
            }

            if diag::take_reconfig(&self.diag) {
                let params = (self.params_loader)();
                let reloaded = MigrationConfig::from_params(&params);
                info!(interval = ?reloaded.interval, "migration configuration reloaded");
                *self.config.lock() = reloaded;
            }

            match self.tick().await {
                TickOutcome::Dispatched(_worker) => {
                    // The worker is detached; migration_active covers it.
                    short_sleep = false;
                }
                TickOutcome::Skipped(reason) => {
                    debug!(reason, "tick skipped");
                    short_sleep = true;
                }
            }
        }
        info!("migration agent stopped");
    }

    /// One agent tick: skip checks, composite lock, worker dispatch.
    pub async fn tick(&self) -> TickOutcome {
        let config = self.config.lock().clone();
        let now = epoch_secs();
        let last_success = *self.last_success.lock();

        if now.saturating_sub(last_success) < config.interval.as_secs() {
            return TickOutcome::Skipped("last cycle too recent");
        }

        let activity = match self.controller.activity().await {
            Ok(activity) => activity,
            Err(e) => {
                warn!(error = %e, "could not read controller activity");
                return TickOutcome::Skipped("activity unavailable");
            }
        };
        if let Some(reason) = skip_reason(&activity, &config, last_success) {
            return TickOutcome::Skipped(reason);
        }

        // Composite lock: the snapshot and the active-flag claim happen
        // under it; the worker does not.
        let locks = self.scheduler_lock.write().await;

        let Some(guard) = ActiveTickGuard::try_begin(&self.diag) else {
            drop(locks);
            return TickOutcome::Skipped("previous worker still active");
        };

        let snapshot = match self.controller.load_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!(error = %e, "could not snapshot jobs");
                drop(guard);
                drop(locks);
                return TickOutcome::Skipped("job snapshot unavailable");
            }
        };

        let driver = MigrationDriver::new(Arc::clone(&self.controller), config.clone());
        let deadline = config.interval;
        let worker =
            tokio::spawn(async move { attempt_migration(driver, snapshot, guard, deadline).await });

        *self.last_success.lock() = now;
        if let Err(e) = self.controller.stage_burst_buffers().await {
            debug!(error = %e, "burst-buffer staging request failed");
        }
        drop(locks);

        TickOutcome::Dispatched(worker)
    }
}

/// Evaluate the cheap skip conditions for a tick.
fn skip_reason(
    activity: &ControllerActivity,
    config: &MigrationConfig,
    last_success: u64,
) -> Option<&'static str> {
    if activity.jobs_completing {
        return Some("jobs completing");
    }
    if config.defer_rpc_cnt > 0 && activity.server_thread_count >= config.defer_rpc_cnt {
        return Some("rpc backlog");
    }
    if !activity.front_end_available {
        return Some("no front end available");
    }
    if !activity.changed_since(last_success) {
        return Some("no job, node, or partition change");
    }
    None
}

/// The non-priority-ordered queue of running jobs in a snapshot.
fn build_running_job_queue(snapshot: &[JobInfo]) -> Vec<&JobInfo> {
    snapshot
        .iter()
        .filter(|j| j.state == JobState::Running)
        .collect()
}

/// One tick's worker: policy pass, then at most one migration.
async fn attempt_migration<C: Controller>(
    driver: MigrationDriver<C>,
    snapshot: Vec<JobInfo>,
    guard: ActiveTickGuard,
    policy_deadline: Duration,
) {
    let started = Instant::now();
    let queue = build_running_job_queue(&snapshot);
    let depth = queue.len() as u32;

    if queue.is_empty() {
        debug!("no running jobs; nothing to migrate");
        guard.finish(started.elapsed(), 0);
        return;
    }

    // Migrating while work is waiting would only reshuffle the queue.
    if snapshot.iter().any(|j| j.state == JobState::Pending) {
        debug!("jobs are pending; not migrating");
        guard.finish(started.elapsed(), depth);
        return;
    }

    let candidate = match tokio::time::timeout(policy_deadline, select_candidate(&driver)).await {
        Ok(candidate) => candidate,
        Err(_) => {
            warn!("policy pass missed its deadline; yielding until the next tick");
            guard.finish(started.elapsed(), depth);
            return;
        }
    };

    // The driver is deliberately outside the deadline: once checkpointing
    // begins it runs to completion.
    if let Some(request) = candidate {
        let job_id = request.job_id;
        match driver.run(&request).await {
            Ok(outcome) => info!(?job_id, ?outcome, "policy migration finished"),
            Err(e) => error!(?job_id, error = %e, "policy migration failed"),
        }
    }

    guard.finish(started.elapsed(), depth);
}

/// Ask the policies, most valuable first, for one migration.
async fn select_candidate<C: Controller>(driver: &MigrationDriver<C>) -> Option<MigrateRequest> {
    match select_compaction_candidate(driver).await {
        Ok(Some(job_id)) => {
            // Destination left unspecified; the scheduler places the job.
            return Some(MigrateRequest::for_job(job_id));
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "compaction policy failed"),
    }

    match select_promotion_candidate(driver).await {
        Ok(Some(candidate)) => {
            let mut request = MigrateRequest::for_job(candidate.job_id);
            request.destination_partition = Some(candidate.partition);
            Some(request)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "promotion policy failed");
            None
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
