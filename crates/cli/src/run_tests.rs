// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;
use sm_adapters::{ControllerCall, FakeController};
use sm_core::test_support;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("smigrate").chain(args.iter().copied())).unwrap()
}

#[test]
fn job_request_carries_every_override() {
    let cli = parse(&[
        "--jobid",
        "42",
        "--stepid",
        "0",
        "--nodes",
        "n[2-3]",
        "--excluded-nodes",
        "n1",
        "--partition",
        "hi",
        "--shared",
        "--spread",
        "--test",
    ]);
    let request = build_request(&cli).unwrap();
    assert_eq!(request.job_id, Some(JobId::new(42)));
    assert_eq!(request.step_id, Some(StepId::new(0)));
    assert_eq!(request.destination_nodes.unwrap().count(), 2);
    assert!(request.excluded_nodes.unwrap().contains("n1"));
    assert_eq!(request.destination_partition.as_deref(), Some("hi"));
    assert_eq!(request.shared, Some(true));
    assert!(request.spread);
    assert!(request.test_only);
}

#[test]
fn shared_accepts_an_explicit_value() {
    let cli = parse(&["--jobid", "1", "--shared", "false"]);
    assert_eq!(build_request(&cli).unwrap().shared, Some(false));

    let cli = parse(&["--jobid", "1"]);
    assert_eq!(build_request(&cli).unwrap().shared, None);
}

#[test]
fn both_jobid_and_drain_node_are_rejected() {
    let cli = parse(&["--jobid", "1", "--drain-node", "n3"]);
    let err = build_request(&cli).unwrap_err();
    assert!(matches!(err, MigrateError::BadArg(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn neither_jobid_nor_drain_node_is_rejected() {
    let cli = parse(&["--test"]);
    assert!(matches!(
        build_request(&cli),
        Err(MigrateError::BadArg(_))
    ));
}

#[test]
fn malformed_hostlist_is_a_bad_arg() {
    let cli = parse(&["--jobid", "1", "--nodes", "n[1-"]);
    assert!(matches!(
        build_request(&cli),
        Err(MigrateError::BadArg(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn executes_a_job_migration() {
    let ctl = FakeController::new().with_job(test_support::running_job(42, "n1"));
    let cli = parse(&["--jobid", "42", "--nodes", "n2"]);
    let request = build_request(&cli).unwrap();

    let outcome = execute(Arc::new(ctl.clone()), MigrationConfig::default(), &request)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        RequestOutcome::Migration(MigrationOutcome::Migrated)
    ));
    assert_eq!(describe(&request, &outcome), "job 42 migrated");
}

#[tokio::test(start_paused = true)]
async fn executes_a_drain() {
    let ctl = FakeController::new()
        .with_node(test_support::node("n3", 4, 1))
        .with_job(test_support::running_job(1, "n3"));
    let cli = parse(&["--drain-node", "n3"]);
    let request = build_request(&cli).unwrap();

    let outcome = execute(Arc::new(ctl.clone()), MigrationConfig::default(), &request)
        .await
        .unwrap();
    assert_eq!(
        describe(&request, &outcome),
        "node n3 drained: 1 migrated, 0 skipped"
    );
}

#[tokio::test(start_paused = true)]
async fn test_flag_keeps_the_request_read_only() {
    let ctl = FakeController::new().with_job(test_support::running_job(42, "n1"));
    let cli = parse(&["--jobid", "42", "--test"]);
    let request = build_request(&cli).unwrap();

    let outcome = execute(Arc::new(ctl.clone()), MigrationConfig::default(), &request)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        RequestOutcome::Migration(MigrationOutcome::Feasible)
    ));
    assert!(!ctl
        .calls()
        .iter()
        .any(|c| matches!(c, ControllerCall::Vacate { .. })));
}

#[tokio::test(start_paused = true)]
async fn error_kinds_surface_with_their_exit_codes() {
    let ctl = FakeController::new();
    let cli = parse(&["--jobid", "7"]);
    let request = build_request(&cli).unwrap();

    let err = execute(Arc::new(ctl), MigrationConfig::default(), &request)
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::NotJob(_)));
    assert_eq!(err.exit_code(), 2);
}
