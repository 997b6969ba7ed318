// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Migration error taxonomy.

use crate::id::JobId;
use thiserror::Error;

/// Errors reported by the migration driver and its callers.
///
/// Each variant maps to a distinct process exit code so scripts driving the
/// front-end can tell the failure classes apart.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Conflicting or nonsensical request.
    #[error("invalid migration request: {0}")]
    BadArg(String),

    /// The job id does not resolve to any known job.
    #[error("no such job: {0}")]
    NotJob(JobId),

    /// The job exists but is not in a state compatible with migration.
    #[error("job {job_id} cannot be migrated: {reason}")]
    JobError { job_id: JobId, reason: String },

    /// Destination nodes or partition unusable.
    #[error("destination unusable: {0}")]
    DestError(String),

    /// Generic failure during checkpoint, wait, restart, or update.
    #[error("migration failed: {0}")]
    Failed(String),
}

impl MigrateError {
    /// Process exit code for this error kind. Success is 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::BadArg(_) => 1,
            MigrateError::NotJob(_) => 2,
            MigrateError::JobError { .. } => 3,
            MigrateError::DestError(_) => 4,
            MigrateError::Failed(_) => 5,
        }
    }

    /// Shorthand for a [`MigrateError::JobError`].
    pub fn job_error(job_id: JobId, reason: impl Into<String>) -> Self {
        MigrateError::JobError {
            job_id,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
