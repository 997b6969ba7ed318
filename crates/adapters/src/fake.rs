// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake controller for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::controller::{CheckpointAble, Controller, ControllerActivity, ControllerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use sm_core::{JobDesc, JobId, JobInfo, JobState, NodeInfo, NodeState, PartitionInfo, StepId};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded call to FakeController. Read-only loads are not recorded; the
/// interesting assertions are about probes and mutations.
#[derive(Debug, Clone)]
pub enum ControllerCall {
    CheckpointAble {
        job_id: JobId,
        step_id: Option<StepId>,
    },
    Vacate {
        job_id: JobId,
        step_id: Option<StepId>,
        dir: PathBuf,
    },
    Restart {
        job_id: JobId,
        step_id: Option<StepId>,
        dir: PathBuf,
    },
    WillRun {
        desc: JobDesc,
    },
    UpdateJob {
        desc: JobDesc,
    },
    UpdateNode {
        name: String,
        state: NodeState,
    },
    TopJob {
        job_id: JobId,
    },
    StageBurstBuffers,
}

/// How a vacated job progresses through the driver's wait states:
/// `running_polls` more loads report it running, then `complete_polls`
/// loads report the exit state, then the record is purged.
#[derive(Debug, Clone)]
struct VacateProgress {
    running_polls: u32,
    complete_polls: u32,
    exit_state: JobState,
    job: JobInfo,
}

struct FakeState {
    jobs: Vec<JobInfo>,
    nodes: Vec<NodeInfo>,
    partitions: Vec<PartitionInfo>,
    activity: ControllerActivity,
    calls: Vec<ControllerCall>,
    not_checkpointable: HashSet<JobId>,
    #[allow(clippy::type_complexity)]
    will_run: Option<Arc<dyn Fn(&JobDesc) -> bool + Send + Sync>>,
    vacate_error: Option<String>,
    restart_error: Option<String>,
    update_job_error: Option<String>,
    vacated: HashMap<JobId, VacateProgress>,
    /// State a vacated job exits in; Complete unless a test overrides it.
    vacate_exit_state: JobState,
    /// Poll counts applied to the next vacate.
    vacate_running_polls: u32,
    vacate_complete_polls: u32,
}

/// Fake controller for testing
///
/// Holds a scripted cluster in memory, records probe and mutation calls, and
/// walks vacated jobs through the running → complete → purged progression
/// the driver's wait states poll for.
#[derive(Clone)]
pub struct FakeController {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeController {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeController {
    /// Create an empty fake cluster with a reachable front end.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                jobs: Vec::new(),
                nodes: Vec::new(),
                partitions: Vec::new(),
                activity: ControllerActivity {
                    front_end_available: true,
                    ..ControllerActivity::default()
                },
                calls: Vec::new(),
                not_checkpointable: HashSet::new(),
                will_run: None,
                vacate_error: None,
                restart_error: None,
                update_job_error: None,
                vacated: HashMap::new(),
                vacate_exit_state: JobState::Complete,
                vacate_running_polls: 1,
                vacate_complete_polls: 1,
            })),
        }
    }

    /// Add a job to the cluster.
    pub fn with_job(self, job: JobInfo) -> Self {
        self.inner.lock().jobs.push(job);
        self
    }

    /// Add a node to the cluster.
    pub fn with_node(self, node: NodeInfo) -> Self {
        self.inner.lock().nodes.push(node);
        self
    }

    /// Add a partition to the cluster.
    pub fn with_partition(self, partition: PartitionInfo) -> Self {
        self.inner.lock().partitions.push(partition);
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ControllerCall> {
        self.inner.lock().calls.clone()
    }

    /// Clear recorded calls
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Mark a job as not checkpointable.
    pub fn set_not_checkpointable(&self, job_id: JobId) {
        self.inner.lock().not_checkpointable.insert(job_id);
    }

    /// Script the `job_will_run` answer. The hook runs outside the fake's
    /// lock, so it may call back into the controller.
    pub fn set_will_run(&self, f: impl Fn(&JobDesc) -> bool + Send + Sync + 'static) {
        self.inner.lock().will_run = Some(Arc::new(f));
    }

    /// Make the next vacate call fail.
    pub fn set_vacate_error(&self, message: impl Into<String>) {
        self.inner.lock().vacate_error = Some(message.into());
    }

    /// Make the next restart call fail.
    pub fn set_restart_error(&self, message: impl Into<String>) {
        self.inner.lock().restart_error = Some(message.into());
    }

    /// Make the next update_job call fail.
    pub fn set_update_job_error(&self, message: impl Into<String>) {
        self.inner.lock().update_job_error = Some(message.into());
    }

    /// Make vacated jobs leave the running state as something other than
    /// complete (to exercise the wrong-exit-state path).
    pub fn set_vacate_exit_state(&self, state: JobState) {
        self.inner.lock().vacate_exit_state = state;
    }

    /// How many loads report a vacated job as still running, then as exited,
    /// before the record is purged.
    pub fn set_vacate_polls(&self, running: u32, complete: u32) {
        let mut state = self.inner.lock();
        state.vacate_running_polls = running;
        state.vacate_complete_polls = complete;
    }

    /// Replace the activity snapshot.
    pub fn set_activity(&self, activity: ControllerActivity) {
        self.inner.lock().activity = activity;
    }

    /// Read back a job, if the controller still knows it.
    pub fn job(&self, job_id: JobId) -> Option<JobInfo> {
        let state = self.inner.lock();
        state.jobs.iter().find(|j| j.job_id == job_id).cloned()
    }

    /// Read back a node.
    pub fn node(&self, name: &str) -> Option<NodeInfo> {
        let state = self.inner.lock();
        state.nodes.iter().find(|n| n.name == name).cloned()
    }

    /// Replace a job's state in place.
    pub fn set_job_state(&self, job_id: JobId, job_state: JobState) {
        let mut state = self.inner.lock();
        if let Some(job) = state.jobs.iter_mut().find(|j| j.job_id == job_id) {
            job.state = job_state;
        }
    }
}

#[async_trait]
impl Controller for FakeController {
    async fn load_jobs(&self) -> Result<Vec<JobInfo>, ControllerError> {
        Ok(self.inner.lock().jobs.clone())
    }

    async fn load_job(&self, job_id: JobId) -> Result<JobInfo, ControllerError> {
        let mut state = self.inner.lock();

        // A vacated job winds through running → exit state → purged.
        if let Some(progress) = state.vacated.get_mut(&job_id) {
            if progress.running_polls > 0 {
                progress.running_polls -= 1;
                let mut job = progress.job.clone();
                job.state = JobState::Running;
                return Ok(job);
            }
            if progress.complete_polls > 0 {
                progress.complete_polls -= 1;
                let mut job = progress.job.clone();
                job.state = progress.exit_state;
                return Ok(job);
            }
            state.vacated.remove(&job_id);
            return Err(ControllerError::JobNotFound(job_id));
        }

        state
            .jobs
            .iter()
            .find(|j| j.job_id == job_id)
            .cloned()
            .ok_or(ControllerError::JobNotFound(job_id))
    }

    async fn load_nodes(&self) -> Result<Vec<NodeInfo>, ControllerError> {
        Ok(self.inner.lock().nodes.clone())
    }

    async fn load_node(&self, name: &str) -> Result<NodeInfo, ControllerError> {
        let state = self.inner.lock();
        state
            .nodes
            .iter()
            .find(|n| n.name == name)
            .cloned()
            .ok_or_else(|| ControllerError::NodeNotFound(name.into()))
    }

    async fn load_partitions(&self) -> Result<Vec<PartitionInfo>, ControllerError> {
        Ok(self.inner.lock().partitions.clone())
    }

    async fn checkpoint_able(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
    ) -> Result<CheckpointAble, ControllerError> {
        let mut state = self.inner.lock();
        state.calls.push(ControllerCall::CheckpointAble { job_id, step_id });
        let able = !state.not_checkpointable.contains(&job_id);
        Ok(CheckpointAble { able, started_at: 0 })
    }

    async fn checkpoint_vacate(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
        dir: &Path,
    ) -> Result<(), ControllerError> {
        let mut state = self.inner.lock();
        state.calls.push(ControllerCall::Vacate {
            job_id,
            step_id,
            dir: dir.to_path_buf(),
        });
        if let Some(message) = state.vacate_error.take() {
            return Err(ControllerError::Request(message));
        }
        let Some(pos) = state.jobs.iter().position(|j| j.job_id == job_id) else {
            return Err(ControllerError::JobNotFound(job_id));
        };
        let job = state.jobs.remove(pos);
        let progress = VacateProgress {
            running_polls: state.vacate_running_polls,
            complete_polls: state.vacate_complete_polls,
            exit_state: state.vacate_exit_state,
            job,
        };
        state.vacated.insert(job_id, progress);
        Ok(())
    }

    async fn checkpoint_restart(
        &self,
        job_id: JobId,
        step_id: Option<StepId>,
        dir: &Path,
    ) -> Result<(), ControllerError> {
        let mut state = self.inner.lock();
        state.calls.push(ControllerCall::Restart {
            job_id,
            step_id,
            dir: dir.to_path_buf(),
        });
        if let Some(message) = state.restart_error.take() {
            return Err(ControllerError::Request(message));
        }
        // The restarted job re-enters the queue as pending.
        if let Some(progress) = state.vacated.remove(&job_id) {
            let mut job = progress.job;
            job.state = JobState::Pending;
            state.jobs.push(job);
        }
        Ok(())
    }

    async fn job_will_run(&self, desc: &JobDesc) -> Result<bool, ControllerError> {
        let hook = {
            let mut state = self.inner.lock();
            state.calls.push(ControllerCall::WillRun { desc: desc.clone() });
            state.will_run.clone()
        };
        Ok(hook.map_or(true, |f| f(desc)))
    }

    async fn update_job(&self, desc: &JobDesc) -> Result<(), ControllerError> {
        let mut state = self.inner.lock();
        state.calls.push(ControllerCall::UpdateJob { desc: desc.clone() });
        if let Some(message) = state.update_job_error.take() {
            return Err(ControllerError::Request(message));
        }
        let Some(job_id) = desc.job_id else {
            return Err(ControllerError::Request("update without job id".into()));
        };
        let Some(job) = state.jobs.iter_mut().find(|j| j.job_id == job_id) else {
            return Err(ControllerError::JobNotFound(job_id));
        };
        if let Some(nodes) = &desc.req_nodes {
            job.req_nodes = nodes.clone();
        }
        if let Some(nodes) = &desc.exc_nodes {
            job.exc_nodes = nodes.clone();
        }
        if let Some(partition) = &desc.partition {
            job.partition = partition.clone();
        }
        if let Some(shared) = desc.shared {
            job.shared = shared;
        }
        Ok(())
    }

    async fn update_node(&self, name: &str, node_state: NodeState) -> Result<(), ControllerError> {
        let mut state = self.inner.lock();
        state.calls.push(ControllerCall::UpdateNode {
            name: name.into(),
            state: node_state,
        });
        let Some(node) = state.nodes.iter_mut().find(|n| n.name == name) else {
            return Err(ControllerError::NodeNotFound(name.into()));
        };
        node.state = node_state;
        Ok(())
    }

    async fn top_job(&self, job_id: JobId) -> Result<(), ControllerError> {
        let mut state = self.inner.lock();
        state.calls.push(ControllerCall::TopJob { job_id });
        if state.jobs.iter().any(|j| j.job_id == job_id) {
            Ok(())
        } else {
            Err(ControllerError::JobNotFound(job_id))
        }
    }

    async fn stage_burst_buffers(&self) -> Result<(), ControllerError> {
        self.inner.lock().calls.push(ControllerCall::StageBurstBuffers);
        Ok(())
    }

    async fn activity(&self) -> Result<ControllerActivity, ControllerError> {
        Ok(self.inner.lock().activity)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
