// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compaction policy.
//!
//! Looks for a partially allocated node whose load could be absorbed by the
//! idle slack already present on other busy nodes, and nominates one of its
//! jobs for migration so the node can be emptied. The destination is left
//! unspecified; the scheduler places the restarted job.

use crate::driver::MigrationDriver;
use sm_adapters::{Controller, ControllerError};
use sm_core::{JobId, MigrateRequest};
use tracing::debug;

/// Select one job whose migration would consolidate load.
///
/// Returns the job to migrate, or `None` when no node can be emptied.
pub async fn select_compaction_candidate<C: Controller>(
    driver: &MigrationDriver<C>,
) -> Result<Option<JobId>, ControllerError> {
    let controller = driver.controller();
    let nodes = controller.load_nodes().await?;
    let jobs = controller.load_jobs().await?;

    // Idle CPUs seen so far on other partially allocated nodes.
    let mut idle_on_mixed: u32 = 0;

    'nodes: for node in &nodes {
        if node.name.is_empty() || !node.state.has_allocations() {
            continue;
        }
        let idle_cpus = node.idle_cpus();
        if idle_cpus == 0 {
            continue;
        }
        debug!(
            node = node.name,
            idle_cpus,
            alloc_cpus = node.alloc_cpus,
            "compaction candidate node"
        );

        // Can the slack observed elsewhere plausibly absorb this node's load?
        if idle_on_mixed < node.alloc_cpus {
            idle_on_mixed += idle_cpus;
            continue;
        }

        // Every job on the node must be single-node and individually movable.
        let mut last_movable: Option<JobId> = None;
        for job in jobs.iter().filter(|j| j.nodes.contains(&node.name)) {
            if job.spans_multiple_nodes() {
                debug!(
                    node = node.name,
                    job_id = %job.job_id,
                    "job spans multiple nodes; node cannot be emptied"
                );
                continue 'nodes;
            }
            let mut probe = MigrateRequest::for_job(job.job_id);
            probe.test_only = true;
            if driver.run(&probe).await.is_err() {
                debug!(
                    node = node.name,
                    job_id = %job.job_id,
                    "job cannot be migrated away; node cannot be emptied"
                );
                continue 'nodes;
            }
            last_movable = Some(job.job_id);
        }

        if let Some(job_id) = last_movable {
            debug!(node = node.name, %job_id, "compaction selected a job");
            return Ok(Some(job_id));
        }
    }

    Ok(None)
}

#[cfg(test)]
#[path = "compact_tests.rs"]
mod tests;
