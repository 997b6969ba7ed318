// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition descriptors as read from the controller.

use crate::hostlist::Hostlist;
use serde::{Deserialize, Serialize};

/// Whether a partition accepts work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionState {
    Up,
    Down,
}

/// A partition as reported by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub name: String,
    pub state: PartitionState,
    /// Member nodes.
    pub nodes: Hostlist,
    /// Scheduling weight; higher means more important.
    pub priority_job_factor: u16,
}
