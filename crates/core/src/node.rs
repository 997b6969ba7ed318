// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node descriptors as read from the controller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller-visible node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Idle,
    Allocated,
    /// Partially allocated: some CPUs busy, some idle.
    Mixed,
    Drain,
    Down,
    Unknown,
}

impl NodeState {
    /// Whether the node can contribute capacity to placement decisions.
    pub fn is_schedulable(self) -> bool {
        matches!(self, NodeState::Idle | NodeState::Allocated | NodeState::Mixed)
    }

    /// Whether any CPUs on the node are in use.
    pub fn has_allocations(self) -> bool {
        matches!(self, NodeState::Allocated | NodeState::Mixed)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Idle => write!(f, "idle"),
            NodeState::Allocated => write!(f, "allocated"),
            NodeState::Mixed => write!(f, "mixed"),
            NodeState::Drain => write!(f, "drain"),
            NodeState::Down => write!(f, "down"),
            NodeState::Unknown => write!(f, "unknown"),
        }
    }
}

/// A node as reported by the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub cpus: u32,
    pub alloc_cpus: u32,
    pub state: NodeState,
    /// Opaque plugin-specific selection record, passed through untouched.
    #[serde(default)]
    pub select_info: Option<serde_json::Value>,
}

impl NodeInfo {
    /// CPUs not currently allocated to any job.
    pub fn idle_cpus(&self) -> u32 {
        self.cpus.saturating_sub(self.alloc_cpus)
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
