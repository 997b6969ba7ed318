// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor builders for tests.
//!
//! These produce minimal but internally consistent cluster descriptors so
//! tests only spell out the fields they care about.

use crate::hostlist::Hostlist;
use crate::id::JobId;
use crate::job::{JobInfo, JobState};
use crate::node::{NodeInfo, NodeState};
use crate::partition::{PartitionInfo, PartitionState};

/// A running single-task job on `nodes` (a hostlist expression).
pub fn running_job(id: u32, nodes: &str) -> JobInfo {
    let nodes = Hostlist::parse(nodes).unwrap_or_default();
    let node_count = nodes.count() as u32;
    JobInfo {
        job_id: JobId::new(id),
        steps: Vec::new(),
        state: JobState::Running,
        partition: "batch".into(),
        nodes,
        req_nodes: Hostlist::new(),
        exc_nodes: Hostlist::new(),
        whole_node: false,
        shared: false,
        contiguous: false,
        min_nodes: node_count.max(1),
        tasks_per_node: 1,
        num_tasks: node_count.max(1),
        cpu_count: node_count.max(1),
        priority: 100,
        account: None,
        comment: None,
        dependency: None,
        features: None,
        gres: None,
        licenses: None,
        name: format!("job{id}"),
        network: None,
        nice: 0,
        reboot: false,
        time_limit: 60,
        time_min: 0,
        user_id: 1000,
        group_id: 1000,
        pn_min_cpus: 1,
        pn_min_memory: 0,
        pn_min_tmp_disk: 0,
        select_info: None,
        wait4switch: 0,
        wckey: None,
    }
}

/// A node with the given total and allocated CPU counts; state is derived
/// from the allocation (idle / mixed / allocated).
pub fn node(name: &str, cpus: u32, alloc_cpus: u32) -> NodeInfo {
    let state = if alloc_cpus == 0 {
        NodeState::Idle
    } else if alloc_cpus < cpus {
        NodeState::Mixed
    } else {
        NodeState::Allocated
    };
    NodeInfo {
        name: name.into(),
        cpus,
        alloc_cpus,
        state,
        select_info: None,
    }
}

/// An up partition over `nodes` (a hostlist expression).
pub fn partition(name: &str, priority_job_factor: u16, nodes: &str) -> PartitionInfo {
    PartitionInfo {
        name: name.into(),
        state: PartitionState::Up,
        nodes: Hostlist::parse(nodes).unwrap_or_default(),
        priority_job_factor,
    }
}
