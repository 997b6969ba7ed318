// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one-shot request front-end: argument vector in, driver call out.

use crate::Cli;
use sm_adapters::Controller;
use sm_core::{Hostlist, JobId, MigrateError, MigrateRequest, MigrationConfig, StepId};
use sm_engine::{drain_node, DrainOutcome, MigrationDriver, MigrationOutcome};
use std::sync::Arc;

/// What a request ended up doing.
#[derive(Debug)]
pub enum RequestOutcome {
    Migration(MigrationOutcome),
    Drained(DrainOutcome),
}

/// Turn parsed arguments into a validated migration request.
pub fn build_request(cli: &Cli) -> Result<MigrateRequest, MigrateError> {
    let request = MigrateRequest {
        job_id: cli.jobid.map(JobId::new),
        step_id: cli.stepid.map(StepId::new),
        destination_nodes: parse_hostlist(cli.nodes.as_deref())?,
        excluded_nodes: parse_hostlist(cli.excluded_nodes.as_deref())?,
        drain_node: cli.drain_node.clone(),
        destination_partition: cli.partition.clone(),
        shared: cli.shared,
        spread: cli.spread,
        test_only: cli.test,
    };
    request.validate()?;
    Ok(request)
}

fn parse_hostlist(expr: Option<&str>) -> Result<Option<Hostlist>, MigrateError> {
    let Some(expr) = expr else {
        return Ok(None);
    };
    let list = Hostlist::parse(expr)
        .map_err(|e| MigrateError::BadArg(format!("bad hostlist '{expr}': {e}")))?;
    if list.is_empty() {
        return Ok(None);
    }
    Ok(Some(list))
}

/// Run one validated request against the controller.
pub async fn execute<C: Controller>(
    controller: Arc<C>,
    config: MigrationConfig,
    request: &MigrateRequest,
) -> Result<RequestOutcome, MigrateError> {
    let driver = MigrationDriver::new(controller, config);
    if request.drain_node.is_some() {
        let outcome = drain_node(&driver, request).await?;
        Ok(RequestOutcome::Drained(outcome))
    } else {
        let outcome = driver.run(request).await?;
        Ok(RequestOutcome::Migration(outcome))
    }
}

/// Human-readable result line for stdout.
pub fn describe(request: &MigrateRequest, outcome: &RequestOutcome) -> String {
    match outcome {
        RequestOutcome::Migration(MigrationOutcome::Feasible) => match request.job_id {
            Some(job_id) => format!("job {job_id} can be migrated"),
            None => "migration is feasible".to_string(),
        },
        RequestOutcome::Migration(MigrationOutcome::Migrated) => match request.job_id {
            Some(job_id) => format!("job {job_id} migrated"),
            None => "migration complete".to_string(),
        },
        RequestOutcome::Drained(drained) => {
            let node = request.drain_node.as_deref().unwrap_or("?");
            format!(
                "node {node} drained: {} migrated, {} skipped",
                drained.migrated.len(),
                drained.skipped.len()
            )
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
