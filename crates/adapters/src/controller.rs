// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The controller seam.
//!
//! Everything the migration subsystem needs from the workload controller,
//! expressed as one async trait. The dependency points one way only: the
//! driver and policies call in, the controller never calls back.

use crate::protocol::ProtocolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sm_core::{JobDesc, JobId, JobInfo, NodeInfo, NodeState, PartitionInfo, StepId};
use std::path::Path;
use thiserror::Error;

/// Errors from controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The job id does not resolve to any job record.
    #[error("job not found: {0}")]
    JobNotFound(JobId),
    /// The node name does not resolve to any node record.
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// The controller rejected or failed the operation.
    #[error("controller request failed: {0}")]
    Request(String),
    /// Transport-level failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// The controller answered with a response of the wrong shape.
    #[error("unexpected response from controller")]
    UnexpectedResponse,
}

/// Answer to a checkpointability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointAble {
    pub able: bool,
    /// Epoch seconds of the last checkpoint start, zero if none.
    pub started_at: u64,
}

/// Point-in-time controller activity, consumed by the agent's skip checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerActivity {
    /// Epoch seconds of the last job table change.
    pub last_job_update: u64,
    /// Epoch seconds of the last node table change.
    pub last_node_update: u64,
    /// Epoch seconds of the last partition table change.
    pub last_part_update: u64,
    /// RPC threads currently serving requests.
    pub server_thread_count: u32,
    /// Whether any job is in the completing phase.
    pub jobs_completing: bool,
    /// Whether a front-end node is available for work.
    pub front_end_available: bool,
}

impl ControllerActivity {
    /// Whether any job, node, or partition change happened at or after
    /// `since` (epoch seconds).
    pub fn changed_since(&self, since: u64) -> bool {
        self.last_job_update >= since
            || self.last_node_update >= since
            || self.last_part_update >= since
    }
}

/// Operations the migration subsystem performs against the controller.
#[async_trait]
pub trait Controller: Send + Sync + 'static {
    /// Enumerate all jobs.
    async fn load_jobs(&self) -> Result<Vec<JobInfo>, ControllerError>;

    /// Load one job by id.
    async fn load_job(&self, job_id: JobId) -> Result<JobInfo, ControllerError>;

    /// Enumerate all nodes.
    async fn load_nodes(&self) -> Result<Vec<NodeInfo>, ControllerError>;

    /// Load one node by name.
    async fn load_node(&self, name: &str) -> Result<NodeInfo, ControllerError>;

    /// Enumerate all partitions.
    async fn load_partitions(&self) -> Result<Vec<PartitionInfo>, ControllerError>;

    /// Ask whether a job (or one step of it) can be checkpointed.
    async fn checkpoint_able(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
    ) -> Result<CheckpointAble, ControllerError>;

    /// Checkpoint the job and terminate it.
    async fn checkpoint_vacate(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
        dir: &Path,
    ) -> Result<(), ControllerError>;

    /// Resubmit the job from its checkpoint image.
    async fn checkpoint_restart(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
        dir: &Path,
    ) -> Result<(), ControllerError>;

    /// Ask whether a hypothetical submission would be schedulable.
    async fn job_will_run(&self, desc: &JobDesc) -> Result<bool, ControllerError>;

    /// Apply the set fields of `desc` to the job it names.
    async fn update_job(&self, desc: &JobDesc) -> Result<(), ControllerError>;

    /// Set a node's state.
    async fn update_node(&self, name: &str, state: NodeState) -> Result<(), ControllerError>;

    /// Move a queued job to the head of its partition's queue.
    async fn top_job(&self, job_id: JobId) -> Result<(), ControllerError>;

    /// Ask the controller to opportunistically stage burst-buffer data for
    /// queued jobs. Best-effort; failures are the controller's problem.
    async fn stage_burst_buffers(&self) -> Result<(), ControllerError>;

    /// Current controller activity snapshot.
    async fn activity(&self) -> Result<ControllerActivity, ControllerError>;
}
