// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job descriptors as read from and written to the controller.

use crate::hostlist::Hostlist;
use crate::id::{JobId, StepId, NO_VAL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority value that marks a job description as hypothetical.
///
/// Feasibility probes submit a copy of the job with this priority so the
/// controller can tell the probe apart from a real submission.
pub const HYPOTHETICAL_PRIORITY: u32 = NO_VAL - 1;

/// Controller-visible job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Complete,
    Failed,
    /// Any state this subsystem does not act on (suspended, cancelled, ...).
    Other,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Running => write!(f, "running"),
            JobState::Complete => write!(f, "complete"),
            JobState::Failed => write!(f, "failed"),
            JobState::Other => write!(f, "other"),
        }
    }
}

/// A job as reported by the controller.
///
/// Placement fields drive migration decisions; the submission fields are
/// carried so a feasibility probe can present a faithful copy of the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub job_id: JobId,
    #[serde(default)]
    pub steps: Vec<StepId>,
    pub state: JobState,

    // Placement
    pub partition: String,
    /// Nodes the job currently occupies.
    pub nodes: Hostlist,
    /// Nodes the user required at submission (empty = no pinning).
    #[serde(default)]
    pub req_nodes: Hostlist,
    #[serde(default)]
    pub exc_nodes: Hostlist,
    #[serde(default)]
    pub whole_node: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub contiguous: bool,
    pub min_nodes: u32,
    pub tasks_per_node: u32,
    pub num_tasks: u32,
    pub cpu_count: u32,
    pub priority: u32,

    // Submission fields copied into feasibility probes
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub dependency: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub gres: Option<String>,
    #[serde(default)]
    pub licenses: Option<String>,
    pub name: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub nice: u32,
    #[serde(default)]
    pub reboot: bool,
    pub time_limit: u32,
    #[serde(default)]
    pub time_min: u32,
    pub user_id: u32,
    pub group_id: u32,
    #[serde(default)]
    pub pn_min_cpus: u32,
    #[serde(default)]
    pub pn_min_memory: u64,
    #[serde(default)]
    pub pn_min_tmp_disk: u64,
    /// Opaque plugin-specific selection record, passed through untouched.
    #[serde(default)]
    pub select_info: Option<serde_json::Value>,
    #[serde(default)]
    pub wait4switch: u32,
    #[serde(default)]
    pub wckey: Option<String>,
}

impl JobInfo {
    /// Whether the job occupies more than one node.
    pub fn spans_multiple_nodes(&self) -> bool {
        self.nodes.count() > 1
    }
}

/// A job description submitted to the controller, either as a feasibility
/// probe (`job_will_run`) or as a placement update (`update_job`).
///
/// Unset fields are left untouched by the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDesc {
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub req_nodes: Option<Hostlist>,
    #[serde(default)]
    pub exc_nodes: Option<Hostlist>,
    #[serde(default)]
    pub shared: Option<bool>,
    #[serde(default)]
    pub spread: bool,
    #[serde(default)]
    pub num_tasks: Option<u32>,
    #[serde(default)]
    pub min_nodes: Option<u32>,
    #[serde(default)]
    pub contiguous: Option<bool>,

    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub dependency: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub gres: Option<String>,
    #[serde(default)]
    pub licenses: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub nice: Option<u32>,
    #[serde(default)]
    pub reboot: Option<bool>,
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub time_min: Option<u32>,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(default)]
    pub group_id: Option<u32>,
    #[serde(default)]
    pub pn_min_cpus: Option<u32>,
    #[serde(default)]
    pub pn_min_memory: Option<u64>,
    #[serde(default)]
    pub pn_min_tmp_disk: Option<u64>,
    #[serde(default)]
    pub select_info: Option<serde_json::Value>,
    #[serde(default)]
    pub wait4switch: Option<u32>,
    #[serde(default)]
    pub wckey: Option<String>,
}

impl JobDesc {
    /// Copy every user-visible submission field of `job` into a description.
    ///
    /// Feasibility tests cannot be performed on the live job record, so a
    /// full copy is presented to the controller instead.
    pub fn from_job(job: &JobInfo) -> Self {
        Self {
            job_id: Some(job.job_id),
            priority: Some(job.priority),
            partition: Some(job.partition.clone()),
            req_nodes: if job.req_nodes.is_empty() {
                None
            } else {
                Some(job.req_nodes.clone())
            },
            exc_nodes: if job.exc_nodes.is_empty() {
                None
            } else {
                Some(job.exc_nodes.clone())
            },
            shared: Some(job.shared),
            spread: false,
            num_tasks: Some(job.num_tasks),
            min_nodes: Some(job.min_nodes),
            contiguous: Some(job.contiguous),
            account: job.account.clone(),
            comment: job.comment.clone(),
            dependency: job.dependency.clone(),
            features: job.features.clone(),
            gres: job.gres.clone(),
            licenses: job.licenses.clone(),
            name: Some(job.name.clone()),
            network: job.network.clone(),
            nice: Some(job.nice),
            reboot: Some(job.reboot),
            time_limit: Some(job.time_limit),
            time_min: Some(job.time_min),
            user_id: Some(job.user_id),
            group_id: Some(job.group_id),
            pn_min_cpus: Some(job.pn_min_cpus),
            pn_min_memory: Some(job.pn_min_memory),
            pn_min_tmp_disk: Some(job.pn_min_tmp_disk),
            select_info: job.select_info.clone(),
            wait4switch: Some(job.wait4switch),
            wckey: job.wckey.clone(),
        }
    }

    /// Turn this description into a hypothetical submission: no job id, and
    /// the probe priority marker.
    pub fn hypothetical(mut self) -> Self {
        self.job_id = None;
        self.priority = Some(HYPOTHETICAL_PRIORITY);
        self
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
