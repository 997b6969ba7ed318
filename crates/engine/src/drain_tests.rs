// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::driver::MigrationDriver;
use sm_adapters::{ControllerCall, FakeController};
use sm_core::test_support;
use sm_core::{Hostlist, MigrationConfig};
use std::sync::Arc;

fn driver(ctl: &FakeController) -> MigrationDriver<FakeController> {
    MigrationDriver::new(Arc::new(ctl.clone()), MigrationConfig::default())
}

#[tokio::test(start_paused = true)]
async fn drains_every_job_off_the_node() {
    let ctl = FakeController::new()
        .with_node(test_support::node("n3", 4, 2))
        .with_node(test_support::node("n4", 4, 0))
        .with_job(test_support::running_job(1, "n3"))
        .with_job(test_support::running_job(2, "n3"))
        .with_job(test_support::running_job(3, "n4"));

    let outcome = drain_node(&driver(&ctl), &MigrateRequest::for_drain("n3"))
        .await
        .unwrap();
    assert_eq!(outcome.migrated, vec![JobId::new(1), JobId::new(2)]);
    assert!(outcome.skipped.is_empty());

    // The node stays drained; the resident jobs were re-queued with the
    // target excluded.
    assert_eq!(ctl.node("n3").unwrap().state, NodeState::Drain);
    for id in [1, 2] {
        let job = ctl.job(JobId::new(id)).unwrap();
        assert_eq!(job.state, JobState::Pending);
        assert!(job.exc_nodes.contains("n3"));
    }
    // The unrelated job was untouched.
    assert_eq!(ctl.job(JobId::new(3)).unwrap().state, JobState::Running);
}

#[tokio::test(start_paused = true)]
async fn unknown_target_is_a_dest_error() {
    let ctl = FakeController::new();
    let err = drain_node(&driver(&ctl), &MigrateRequest::for_drain("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::DestError(_)));
}

/// Scenario: node hosts a checkpointable single-node job and a job spanning
/// two nodes. The plan fails on the spanning job, nothing migrates, and the
/// node's previous state comes back.
#[tokio::test(start_paused = true)]
async fn restores_node_state_when_plan_fails() {
    let mut spanning = test_support::running_job(2, "n3,n5");
    spanning.nodes = Hostlist::parse("n3,n5").unwrap();

    let ctl = FakeController::new()
        .with_node(test_support::node("n3", 4, 2))
        .with_job(test_support::running_job(1, "n3"))
        .with_job(spanning);

    let err = drain_node(&driver(&ctl), &MigrateRequest::for_drain("n3"))
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::JobError { .. }));

    // No migration was performed and the state rolled back to mixed.
    assert!(!ctl
        .calls()
        .iter()
        .any(|c| matches!(c, ControllerCall::Vacate { .. })));
    assert_eq!(ctl.node("n3").unwrap().state, NodeState::Mixed);
}

#[tokio::test(start_paused = true)]
async fn restores_node_state_when_execution_fails_midway() {
    let ctl = FakeController::new()
        .with_node(test_support::node("n3", 4, 2))
        .with_job(test_support::running_job(1, "n3"))
        .with_job(test_support::running_job(2, "n3"));
    // Planning passes (dry runs only probe); the first real vacate fails.
    ctl.set_vacate_error("runtime offline");

    let err = drain_node(&driver(&ctl), &MigrateRequest::for_drain("n3"))
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::Failed(_)));
    assert_eq!(ctl.node("n3").unwrap().state, NodeState::Mixed);
}

#[tokio::test(start_paused = true)]
async fn jobs_that_finished_on_their_own_are_skipped() {
    let ctl = FakeController::new()
        .with_node(test_support::node("n3", 4, 2))
        .with_job(test_support::running_job(1, "n3"))
        .with_job(test_support::running_job(2, "n3"));

    // Job 1 finishes after it was planned: when planning probes job 2, flip
    // job 1 to complete. Execution then refreshes job 1 and skips it.
    let hook_ctl = ctl.clone();
    ctl.set_will_run(move |desc| {
        if desc.name.as_deref() == Some("job2") {
            hook_ctl.set_job_state(JobId::new(1), JobState::Complete);
        }
        true
    });

    let outcome = drain_node(&driver(&ctl), &MigrateRequest::for_drain("n3"))
        .await
        .unwrap();
    assert_eq!(outcome.skipped, vec![JobId::new(1)]);
    assert_eq!(outcome.migrated, vec![JobId::new(2)]);
}
