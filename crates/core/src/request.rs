// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration requests.

use crate::error::MigrateError;
use crate::hostlist::Hostlist;
use crate::id::{JobId, StepId};
use serde::{Deserialize, Serialize};

/// A single migration request, built by the front-end or a policy and
/// consumed by one driver invocation.
///
/// Exactly one of `job_id` and `drain_node` must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrateRequest {
    /// Job to migrate.
    pub job_id: Option<JobId>,
    /// Step to checkpoint; unset means the whole job.
    pub step_id: Option<StepId>,
    /// Nodes the restarted job must land on.
    pub destination_nodes: Option<Hostlist>,
    /// Nodes the restarted job must avoid (merged with the job's own
    /// exclusions).
    pub excluded_nodes: Option<Hostlist>,
    /// Node to evacuate instead of migrating a single job.
    pub drain_node: Option<String>,
    /// Partition the restarted job should move to.
    pub destination_partition: Option<String>,
    /// Override the job's shared flag on restart.
    pub shared: Option<bool>,
    /// Spread the restarted job across nodes.
    pub spread: bool,
    /// Feasibility test only; no side effects.
    pub test_only: bool,
}

impl MigrateRequest {
    /// Request migration of a single job.
    pub fn for_job(job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            ..Self::default()
        }
    }

    /// Request evacuation of a node.
    pub fn for_drain(node: impl Into<String>) -> Self {
        Self {
            drain_node: Some(node.into()),
            ..Self::default()
        }
    }

    /// Check the request for internal consistency.
    pub fn validate(&self) -> Result<(), MigrateError> {
        match (self.job_id, self.drain_node.as_deref()) {
            (Some(_), Some(_)) => Err(MigrateError::BadArg(
                "both a job id and a drain node were given".into(),
            )),
            (None, None) => Err(MigrateError::BadArg(
                "neither a job id nor a drain node was given".into(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
