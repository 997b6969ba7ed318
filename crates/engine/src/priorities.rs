// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority-promotion policy.
//!
//! If a low-priority partition holds a running job that fits into the idle
//! capacity of a higher-priority partition, promote it: the job restarts in
//! the more important partition and frees its old one.

use crate::driver::MigrationDriver;
use sm_adapters::{Controller, ControllerError};
use sm_core::{JobId, JobInfo, JobState, MigrateRequest, NodeInfo, PartitionInfo, PartitionState};
use std::collections::HashMap;
use tracing::debug;

/// A promotion the policy judged feasible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionCandidate {
    pub job_id: JobId,
    /// Destination partition.
    pub partition: String,
}

/// Select one job to promote into a higher-priority partition.
pub async fn select_promotion_candidate<C: Controller>(
    driver: &MigrationDriver<C>,
) -> Result<Option<PromotionCandidate>, ControllerError> {
    let controller = driver.controller();
    let mut partitions = controller.load_partitions().await?;
    let nodes = controller.load_nodes().await?;
    let jobs = controller.load_jobs().await?;

    let by_name: HashMap<&str, &NodeInfo> =
        nodes.iter().map(|n| (n.name.as_str(), n)).collect();

    // Ascending by priority; ties keep controller order. Scanning runs from
    // the top down, pairing each partition with every strictly lower one.
    partitions.sort_by_key(|p| p.priority_job_factor);
    let idle: Vec<u32> = partitions
        .iter()
        .map(|p| idle_cpus_on_partition(p, &by_name))
        .collect();

    for hi in (0..partitions.len()).rev() {
        for lo in 0..hi {
            if partitions[lo].priority_job_factor >= partitions[hi].priority_job_factor {
                // Equal priority is not a promotion.
                continue;
            }
            debug!(
                high = partitions[hi].name,
                high_idle = idle[hi],
                low = partitions[lo].name,
                "considering partition pair"
            );

            let Some(job) = find_suitable_job(&jobs, &partitions[lo].name, idle[hi]) else {
                continue;
            };

            let mut probe = MigrateRequest::for_job(job.job_id);
            probe.destination_partition = Some(partitions[hi].name.clone());
            probe.test_only = true;
            if driver.run(&probe).await.is_ok() {
                debug!(
                    job_id = %job.job_id,
                    partition = partitions[hi].name,
                    "promotion selected"
                );
                return Ok(Some(PromotionCandidate {
                    job_id: job.job_id,
                    partition: partitions[hi].name.clone(),
                }));
            }
        }
    }

    Ok(None)
}

/// Idle CPUs across a partition's schedulable members. A partition that is
/// down contributes nothing.
fn idle_cpus_on_partition(partition: &PartitionInfo, nodes: &HashMap<&str, &NodeInfo>) -> u32 {
    if partition.state != PartitionState::Up {
        return 0;
    }
    partition
        .nodes
        .iter()
        .filter_map(|name| nodes.get(name))
        .filter(|node| node.state.is_schedulable())
        .map(|node| node.idle_cpus())
        .sum()
}

/// The largest running job in `partition` that fits `size` idle CPUs and is
/// not pinned to specific nodes.
fn find_suitable_job<'a>(jobs: &'a [JobInfo], partition: &str, size: u32) -> Option<&'a JobInfo> {
    let mut best: Option<&JobInfo> = None;
    for job in jobs {
        if job.state != JobState::Running || job.partition != partition {
            continue;
        }
        if !job.req_nodes.is_empty() {
            continue;
        }
        if job.num_tasks > size {
            continue;
        }
        if best.map_or(true, |b| job.num_tasks > b.num_tasks) {
            best = Some(job);
        }
    }
    best
}

#[cfg(test)]
#[path = "priorities_tests.rs"]
mod tests;
