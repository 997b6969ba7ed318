// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared migration diagnostics.
//!
//! One record, one lock. The agent, its detached workers, and anything that
//! wants to report on migration activity all share an [`Arc`] to this record;
//! nothing in the subsystem keeps module-level mutable state.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Diagnostics and control flags for the migration agent.
#[derive(Debug, Default)]
pub struct DiagStats {
    /// True while a tick's worker task is running. Gates re-entry.
    pub migration_active: bool,
    /// Set when the controller configuration changed; the agent reloads its
    /// tunables and clears it on the next tick.
    pub reconfig_pending: bool,
    /// Completed policy cycles.
    pub cycle_counter: u64,
    /// Duration of the last cycle, excluding sleep.
    pub cycle_last: Duration,
    /// Longest cycle observed.
    pub cycle_max: Duration,
    /// Total time spent in cycles.
    pub cycle_sum: Duration,
    /// Jobs examined by the last cycle.
    pub last_depth: u32,
}

/// The diagnostics record as shared between components.
pub type SharedDiag = Arc<Mutex<DiagStats>>;

/// Create a fresh shared diagnostics record.
pub fn shared_diag() -> SharedDiag {
    Arc::new(Mutex::new(DiagStats::default()))
}

/// Mark that the controller configuration changed.
pub fn request_reconfig(diag: &SharedDiag) {
    diag.lock().reconfig_pending = true;
}

/// Consume a pending reconfiguration request, if any.
pub fn take_reconfig(diag: &SharedDiag) -> bool {
    let mut stats = diag.lock();
    std::mem::take(&mut stats.reconfig_pending)
}

/// RAII ownership of the `migration_active` flag for one tick.
///
/// The flag is cleared on drop, so a worker that panics or returns early can
/// never wedge the agent. Cycle statistics are recorded by [`finish`];
/// a guard dropped without `finish` only clears the flag.
///
/// [`finish`]: ActiveTickGuard::finish
#[derive(Debug)]
pub struct ActiveTickGuard {
    diag: SharedDiag,
}

impl ActiveTickGuard {
    /// Claim the active flag. Returns `None` if a worker is already running.
    pub fn try_begin(diag: &SharedDiag) -> Option<Self> {
        let mut stats = diag.lock();
        if stats.migration_active {
            return None;
        }
        stats.migration_active = true;
        Some(Self { diag: Arc::clone(diag) })
    }

    /// Record cycle statistics for this tick and release the flag.
    pub fn finish(self, elapsed: Duration, depth: u32) {
        let mut stats = self.diag.lock();
        stats.cycle_counter += 1;
        stats.cycle_last = elapsed;
        stats.cycle_sum += elapsed;
        if elapsed > stats.cycle_max {
            stats.cycle_max = elapsed;
        }
        stats.last_depth = depth;
        drop(stats);
        // Drop releases the flag once the stats are in place.
    }
}

impl Drop for ActiveTickGuard {
    fn drop(&mut self) {
        self.diag.lock().migration_active = false;
    }
}

#[cfg(test)]
#[path = "diag_tests.rs"]
mod tests;
