// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-job migration driver.
//!
//! One driver invocation carries one job across the checkpoint boundary:
//!
//! ```text
//! Verify ─▶ DryRun ─▶ Checkpoint ─▶ WaitTerminate ─▶ WaitPurge ─▶ Restart ─▶ UpdatePlacement ─▶ Done
//! ```
//!
//! `DryRun` is terminal for `test_only` requests. Any state can fail; the
//! driver returns the first failure and never rolls back — checkpoint
//! artefacts are left on disk for diagnostics. The driver holds no global
//! lock between states, so drivers for different jobs run concurrently; the
//! controller's own job-write lock serializes `update_job`.

use sm_adapters::dmtcp::job_checkpoint_dir;
use sm_adapters::{Controller, ControllerError};
use sm_core::{
    Hostlist, JobDesc, JobId, JobInfo, JobState, MigrateError, MigrateRequest, MigrationConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a successful driver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// `test_only` was set and the migration is feasible.
    Feasible,
    /// The job was checkpointed, restarted, and re-queued.
    Migrated,
}

/// States of one migration. Transitions are strictly sequential; no state
/// runs until its predecessor returned ok.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriveStep {
    Verify,
    DryRun,
    Checkpoint,
    WaitTerminate,
    WaitPurge,
    Restart,
    UpdatePlacement,
}

/// Drives single migrations against a controller.
#[derive(Debug)]
pub struct MigrationDriver<C: Controller> {
    controller: Arc<C>,
    config: MigrationConfig,
}

impl<C: Controller> Clone for MigrationDriver<C> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            config: self.config.clone(),
        }
    }
}

impl<C: Controller> MigrationDriver<C> {
    pub fn new(controller: Arc<C>, config: MigrationConfig) -> Self {
        Self { controller, config }
    }

    pub fn controller(&self) -> &Arc<C> {
        &self.controller
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Run one migration to completion (or to the first failure).
    ///
    /// The invocation owns `req.job_id` for its whole lifetime; callers must
    /// not start a second driver on the same job.
    pub async fn run(&self, req: &MigrateRequest) -> Result<MigrationOutcome, MigrateError> {
        req.validate()?;
        let job_id = req
            .job_id
            .ok_or_else(|| MigrateError::BadArg("the driver needs a job id".into()))?;

        let mut step = DriveStep::Verify;
        let mut job: Option<JobInfo> = None;
        loop {
            debug!(%job_id, step = ?step, "migration step");
            step = match step {
                DriveStep::Verify => {
                    job = Some(self.verify(job_id, req).await?);
                    DriveStep::DryRun
                }
                DriveStep::DryRun => {
                    let Some(job) = job.as_ref() else {
                        return Err(MigrateError::Failed("verify did not load the job".into()));
                    };
                    self.dry_run(job, req).await?;
                    if req.test_only {
                        return Ok(MigrationOutcome::Feasible);
                    }
                    DriveStep::Checkpoint
                }
                DriveStep::Checkpoint => {
                    self.checkpoint(job_id, req).await?;
                    DriveStep::WaitTerminate
                }
                DriveStep::WaitTerminate => {
                    self.wait_terminate(job_id).await?;
                    DriveStep::WaitPurge
                }
                DriveStep::WaitPurge => {
                    self.wait_purge(job_id).await?;
                    DriveStep::Restart
                }
                DriveStep::Restart => {
                    self.restart(job_id, req).await?;
                    DriveStep::UpdatePlacement
                }
                DriveStep::UpdatePlacement => {
                    let Some(job) = job.as_ref() else {
                        return Err(MigrateError::Failed("verify did not load the job".into()));
                    };
                    self.update_placement(job_id, job, req).await?;
                    info!(%job_id, "migration complete");
                    return Ok(MigrationOutcome::Migrated);
                }
            };
        }
    }

    /// Verify: the job exists, runs, and can be checkpointed; the request
    /// must not fight the user's own node pinning.
    async fn verify(&self, job_id: JobId, req: &MigrateRequest) -> Result<JobInfo, MigrateError> {
        let job = match self.controller.load_job(job_id).await {
            Ok(job) => job,
            Err(ControllerError::JobNotFound(_)) => return Err(MigrateError::NotJob(job_id)),
            Err(e) => return Err(MigrateError::Failed(e.to_string())),
        };

        if job.state != JobState::Running {
            return Err(MigrateError::job_error(
                job_id,
                format!("jobs must be running to be migrated (state: {})", job.state),
            ));
        }

        // Checkpointability is probed for the whole job; per-step probes are
        // unreliable in the underlying runtime.
        let answer = self
            .controller
            .checkpoint_able(job_id, None)
            .await
            .map_err(|e| MigrateError::Failed(e.to_string()))?;
        if !answer.able {
            return Err(MigrateError::job_error(job_id, "job is not checkpointable"));
        }

        if !job.req_nodes.is_empty() && req.destination_nodes.is_some() {
            return Err(MigrateError::job_error(
                job_id,
                "user required specific nodes at submission; conflicting destination",
            ));
        }

        Ok(job)
    }

    /// DryRun: present a hypothetical copy of the job with the requested
    /// placement overrides and ask the scheduler whether it would run.
    async fn dry_run(&self, job: &JobInfo, req: &MigrateRequest) -> Result<(), MigrateError> {
        let mut desc = JobDesc::from_job(job).hypothetical();
        if let Some(shared) = req.shared {
            desc.shared = Some(shared);
        }
        if let Some(nodes) = &req.destination_nodes {
            desc.req_nodes = Some(nodes.clone());
        }
        if let Some(partition) = &req.destination_partition {
            desc.partition = Some(partition.clone());
        }
        if let Some(merged) = merged_exclusions(job, req) {
            desc.exc_nodes = Some(merged);
        }
        if req.spread {
            desc.spread = true;
        }

        let will_run = self
            .controller
            .job_will_run(&desc)
            .await
            .map_err(|e| MigrateError::Failed(e.to_string()))?;
        if !will_run {
            // An explicitly named destination that will not run is a
            // destination problem; without one the cluster is just full.
            if req.destination_nodes.is_some() || req.destination_partition.is_some() {
                return Err(MigrateError::DestError(
                    "requested destination cannot take the job".into(),
                ));
            }
            return Err(MigrateError::Failed(
                "hypothetical submission would not be schedulable".into(),
            ));
        }
        Ok(())
    }

    /// Checkpoint: image the job into its checkpoint directory and vacate it.
    async fn checkpoint(&self, job_id: JobId, req: &MigrateRequest) -> Result<(), MigrateError> {
        let dir = self.checkpoint_dir(job_id);
        self.controller
            .checkpoint_vacate(job_id, req.step_id, &dir)
            .await
            .map_err(|e| MigrateError::Failed(format!("checkpoint vacate: {e}")))?;
        info!(%job_id, dir = %dir.display(), "checkpoint created");
        Ok(())
    }

    /// WaitTerminate: poll until the job leaves the running state. Leaving
    /// in any state but complete is a failure.
    async fn wait_terminate(&self, job_id: JobId) -> Result<(), MigrateError> {
        let deadline = tokio::time::Instant::now() + self.config.wait_timeout;
        loop {
            match self.controller.load_job(job_id).await {
                Ok(job) if job.state == JobState::Running => {}
                Ok(job) if job.state == JobState::Complete => return Ok(()),
                Ok(job) => {
                    return Err(MigrateError::Failed(format!(
                        "job left the running state as {} instead of complete",
                        job.state
                    )));
                }
                // Controller purged the record before we saw it complete;
                // WaitPurge will confirm.
                Err(ControllerError::JobNotFound(_)) => return Ok(()),
                Err(e) => return Err(MigrateError::Failed(e.to_string())),
            }
            self.poll_or_deadline(deadline, job_id, "termination").await?;
        }
    }

    /// WaitPurge: the controller purges completed jobs asynchronously; wait
    /// for the record to disappear so the restart does not collide with it.
    async fn wait_purge(&self, job_id: JobId) -> Result<(), MigrateError> {
        let deadline = tokio::time::Instant::now() + self.config.wait_timeout;
        loop {
            match self.controller.load_job(job_id).await {
                Err(ControllerError::JobNotFound(_)) => return Ok(()),
                Ok(_) => {}
                Err(e) => return Err(MigrateError::Failed(e.to_string())),
            }
            self.poll_or_deadline(deadline, job_id, "purge").await?;
        }
    }

    /// Restart: resubmit the job from its checkpoint image.
    async fn restart(&self, job_id: JobId, req: &MigrateRequest) -> Result<(), MigrateError> {
        let dir = self.checkpoint_dir(job_id);
        self.controller
            .checkpoint_restart(job_id, req.step_id, &dir)
            .await
            .map_err(|e| MigrateError::Failed(format!("checkpoint restart: {e}")))?;
        info!(%job_id, "job restarted from checkpoint");
        Ok(())
    }

    /// UpdatePlacement: apply only the overrides that accompanied the
    /// request, then move the job to the head of its queue.
    async fn update_placement(
        &self,
        job_id: JobId,
        job: &JobInfo,
        req: &MigrateRequest,
    ) -> Result<(), MigrateError> {
        let desc = JobDesc {
            job_id: Some(job_id),
            req_nodes: req.destination_nodes.clone(),
            exc_nodes: merged_exclusions(job, req),
            partition: req.destination_partition.clone(),
            shared: req.shared,
            spread: req.spread,
            ..JobDesc::default()
        };
        self.controller
            .update_job(&desc)
            .await
            .map_err(|e| MigrateError::Failed(format!("placement update: {e}")))?;
        self.controller
            .top_job(job_id)
            .await
            .map_err(|e| MigrateError::Failed(format!("queue top: {e}")))?;
        Ok(())
    }

    fn checkpoint_dir(&self, job_id: JobId) -> PathBuf {
        job_checkpoint_dir(&self.config.checkpoint_root, job_id)
    }

    /// Sleep one poll interval, failing when `deadline` has passed.
    async fn poll_or_deadline(
        &self,
        deadline: tokio::time::Instant,
        job_id: JobId,
        waiting_for: &str,
    ) -> Result<(), MigrateError> {
        if tokio::time::Instant::now() >= deadline {
            warn!(%job_id, waiting_for, "wait state hit its deadline");
            return Err(MigrateError::Failed(format!(
                "timed out waiting for job {waiting_for}"
            )));
        }
        tokio::time::sleep(self.poll_interval()).await;
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.config.state_poll
    }
}

/// The request's exclusions merged with the job's own, deduplicated.
/// `None` when the request excludes nothing.
fn merged_exclusions(job: &JobInfo, req: &MigrateRequest) -> Option<Hostlist> {
    let requested = req.excluded_nodes.as_ref()?;
    let mut merged = job.exc_nodes.clone();
    merged.merge(requested);
    merged.dedup();
    Some(merged)
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
