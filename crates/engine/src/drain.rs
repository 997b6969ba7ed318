// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drain orchestration.
//!
//! Empties a node by cascading migrations. Planning is all-or-nothing:
//! every job on the node must pass a dry run before any real migration
//! starts, and any failure restores the node's previous state. Migrations
//! that already completed stay where they landed.

use crate::driver::MigrationDriver;
use sm_adapters::{Controller, ControllerError};
use sm_core::{JobId, JobState, MigrateError, MigrateRequest, NodeState};
use tracing::{info, warn};

/// What a drain actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Jobs migrated off the node.
    pub migrated: Vec<JobId>,
    /// Jobs that were planned but no longer running when their turn came.
    pub skipped: Vec<JobId>,
}

/// Evacuate every job from the node named in `req.drain_node`.
pub async fn drain_node<C: Controller>(
    driver: &MigrationDriver<C>,
    req: &MigrateRequest,
) -> Result<DrainOutcome, MigrateError> {
    req.validate()?;
    let Some(target) = req.drain_node.as_deref() else {
        return Err(MigrateError::BadArg("drain needs a node name".into()));
    };
    let controller = driver.controller();

    let node = match controller.load_node(target).await {
        Ok(node) => node,
        Err(ControllerError::NodeNotFound(name)) => {
            return Err(MigrateError::DestError(format!("no such node: {name}")));
        }
        Err(e) => return Err(MigrateError::Failed(e.to_string())),
    };

    // Stop new work from landing on the node while we empty it. The previous
    // state comes back if anything below fails.
    let previous_state = node.state;
    controller
        .update_node(target, NodeState::Drain)
        .await
        .map_err(|e| MigrateError::Failed(format!("draining node: {e}")))?;
    info!(node = target, "node set to drain");

    match evacuate(driver, req, target).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            restore_node(controller.as_ref(), target, previous_state).await;
            Err(e)
        }
    }
}

/// Plan and execute the migrations for one drain target.
async fn evacuate<C: Controller>(
    driver: &MigrationDriver<C>,
    req: &MigrateRequest,
    target: &str,
) -> Result<DrainOutcome, MigrateError> {
    let controller = driver.controller();

    // Plan: every resident job must dry-run clean before anything moves.
    let jobs = controller
        .load_jobs()
        .await
        .map_err(|e| MigrateError::Failed(e.to_string()))?;
    let mut planned = Vec::new();
    for job in jobs
        .iter()
        .filter(|j| j.state == JobState::Running && j.nodes.contains(target))
    {
        if job.spans_multiple_nodes() {
            return Err(MigrateError::job_error(
                job.job_id,
                format!("job spans more than one node; cannot empty {target}"),
            ));
        }
        let probe = job_request(req, job.job_id, target, true);
        driver.run(&probe).await?;
        planned.push(job.job_id);
    }
    info!(node = target, jobs = planned.len(), "drain plan verified");

    // Execute in plan order, refreshing each job first; jobs that finished
    // on their own are skipped, not errors.
    let mut outcome = DrainOutcome::default();
    for job_id in planned {
        match controller.load_job(job_id).await {
            Ok(job) if job.state == JobState::Running => {}
            Ok(_) | Err(ControllerError::JobNotFound(_)) => {
                outcome.skipped.push(job_id);
                continue;
            }
            Err(e) => return Err(MigrateError::Failed(e.to_string())),
        }
        driver.run(&job_request(req, job_id, target, false)).await?;
        outcome.migrated.push(job_id);
    }
    Ok(outcome)
}

/// The per-job migration request for a drain: the drain target joins the
/// exclusions, everything else carries over from the drain request.
fn job_request(req: &MigrateRequest, job_id: JobId, target: &str, test_only: bool) -> MigrateRequest {
    let mut excluded = req.excluded_nodes.clone().unwrap_or_default();
    excluded.push(target);
    excluded.dedup();

    MigrateRequest {
        job_id: Some(job_id),
        step_id: None,
        destination_nodes: req.destination_nodes.clone(),
        excluded_nodes: Some(excluded),
        drain_node: None,
        destination_partition: req.destination_partition.clone(),
        shared: req.shared,
        spread: req.spread,
        test_only,
    }
}

async fn restore_node<C: Controller>(controller: &C, target: &str, state: NodeState) {
    if let Err(e) = controller.update_node(target, state).await {
        warn!(node = target, error = %e, "failed to restore node state after drain failure");
    } else {
        info!(node = target, state = %state, "node state restored after drain failure");
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
