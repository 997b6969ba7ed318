// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sm_core::test_support;

#[tokio::test]
async fn vacated_job_progresses_to_purged() {
    let ctl = FakeController::new().with_job(test_support::running_job(42, "n1"));
    ctl.checkpoint_vacate(JobId::new(42), None, Path::new("/ckpt/42"))
        .await
        .unwrap();

    // One poll still running, one poll complete, then gone.
    assert_eq!(
        ctl.load_job(JobId::new(42)).await.unwrap().state,
        JobState::Running
    );
    assert_eq!(
        ctl.load_job(JobId::new(42)).await.unwrap().state,
        JobState::Complete
    );
    assert!(matches!(
        ctl.load_job(JobId::new(42)).await,
        Err(ControllerError::JobNotFound(_))
    ));
}

#[tokio::test]
async fn restart_requeues_the_job_as_pending() {
    let ctl = FakeController::new().with_job(test_support::running_job(42, "n1"));
    ctl.checkpoint_vacate(JobId::new(42), None, Path::new("/ckpt/42"))
        .await
        .unwrap();
    ctl.checkpoint_restart(JobId::new(42), None, Path::new("/ckpt/42"))
        .await
        .unwrap();
    assert_eq!(
        ctl.load_job(JobId::new(42)).await.unwrap().state,
        JobState::Pending
    );
}

#[tokio::test]
async fn update_job_applies_placement_overrides() {
    let ctl = FakeController::new().with_job(test_support::running_job(1, "n1"));
    let desc = JobDesc {
        job_id: Some(JobId::new(1)),
        req_nodes: Some(sm_core::Hostlist::parse("n2").unwrap()),
        partition: Some("hi".into()),
        shared: Some(true),
        ..JobDesc::default()
    };
    ctl.update_job(&desc).await.unwrap();

    let job = ctl.job(JobId::new(1)).unwrap();
    assert!(job.req_nodes.contains("n2"));
    assert_eq!(job.partition, "hi");
    assert!(job.shared);
}

#[tokio::test]
async fn scripted_will_run_answers_by_desc() {
    let ctl = FakeController::new();
    ctl.set_will_run(|desc| desc.partition.as_deref() != Some("full"));

    let ok = JobDesc {
        partition: Some("spare".into()),
        ..JobDesc::default()
    };
    let full = JobDesc {
        partition: Some("full".into()),
        ..JobDesc::default()
    };
    assert!(ctl.job_will_run(&ok).await.unwrap());
    assert!(!ctl.job_will_run(&full).await.unwrap());
}

#[tokio::test]
async fn records_mutation_calls_in_order() {
    let ctl = FakeController::new()
        .with_job(test_support::running_job(1, "n1"))
        .with_node(test_support::node("n1", 2, 1));
    ctl.checkpoint_able(JobId::new(1), None).await.unwrap();
    ctl.update_node("n1", NodeState::Drain).await.unwrap();

    let calls = ctl.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], ControllerCall::CheckpointAble { .. }));
    assert!(matches!(
        calls[1],
        ControllerCall::UpdateNode {
            state: NodeState::Drain,
            ..
        }
    ));
}

#[tokio::test]
async fn injected_vacate_error_fires_once() {
    let ctl = FakeController::new().with_job(test_support::running_job(1, "n1"));
    ctl.set_vacate_error("checkpoint runtime unavailable");
    assert!(ctl
        .checkpoint_vacate(JobId::new(1), None, Path::new("/ckpt/1"))
        .await
        .is_err());
    assert!(ctl
        .checkpoint_vacate(JobId::new(1), None, Path::new("/ckpt/1"))
        .await
        .is_ok());
}
