// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::driver::MigrationDriver;
use sm_adapters::FakeController;
use sm_core::test_support;
use sm_core::MigrationConfig;
use std::sync::Arc;

fn driver(ctl: &FakeController) -> MigrationDriver<FakeController> {
    MigrationDriver::new(Arc::new(ctl.clone()), MigrationConfig::default())
}

/// Partition `lo` (priority 10) holds job K with 4 tasks; `hi` (priority
/// 100) has 4 idle CPUs. The policy promotes K into `hi`.
#[tokio::test(start_paused = true)]
async fn promotes_the_largest_fitting_job() {
    let mut small = test_support::running_job(20, "l2");
    small.partition = "lo".into();
    small.num_tasks = 1;
    let mut job_k = test_support::running_job(21, "l1");
    job_k.partition = "lo".into();
    job_k.num_tasks = 4;

    let ctl = FakeController::new()
        .with_partition(test_support::partition("hi", 100, "h[1-2]"))
        .with_partition(test_support::partition("lo", 10, "l[1-2]"))
        .with_node(test_support::node("h1", 2, 0))
        .with_node(test_support::node("h2", 2, 0))
        .with_node(test_support::node("l1", 4, 4))
        .with_node(test_support::node("l2", 4, 1))
        .with_job(small)
        .with_job(job_k);

    let picked = select_promotion_candidate(&driver(&ctl)).await.unwrap();
    assert_eq!(
        picked,
        Some(PromotionCandidate {
            job_id: sm_core::JobId::new(21),
            partition: "hi".into(),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn oversized_jobs_do_not_fit() {
    let mut big = test_support::running_job(21, "l1");
    big.partition = "lo".into();
    big.num_tasks = 9;

    let ctl = FakeController::new()
        .with_partition(test_support::partition("hi", 100, "h1"))
        .with_partition(test_support::partition("lo", 10, "l1"))
        .with_node(test_support::node("h1", 4, 0))
        .with_node(test_support::node("l1", 16, 9))
        .with_job(big);

    let picked = select_promotion_candidate(&driver(&ctl)).await.unwrap();
    assert_eq!(picked, None);
}

#[tokio::test(start_paused = true)]
async fn pinned_jobs_are_ineligible() {
    let mut pinned = test_support::running_job(21, "l1");
    pinned.partition = "lo".into();
    pinned.req_nodes = sm_core::Hostlist::parse("l1").unwrap();

    let ctl = FakeController::new()
        .with_partition(test_support::partition("hi", 100, "h1"))
        .with_partition(test_support::partition("lo", 10, "l1"))
        .with_node(test_support::node("h1", 4, 0))
        .with_node(test_support::node("l1", 4, 1))
        .with_job(pinned);

    let picked = select_promotion_candidate(&driver(&ctl)).await.unwrap();
    assert_eq!(picked, None);
}

#[tokio::test(start_paused = true)]
async fn equal_priority_is_not_a_promotion() {
    let mut job = test_support::running_job(21, "l1");
    job.partition = "lo".into();

    let ctl = FakeController::new()
        .with_partition(test_support::partition("hi", 50, "h1"))
        .with_partition(test_support::partition("lo", 50, "l1"))
        .with_node(test_support::node("h1", 4, 0))
        .with_node(test_support::node("l1", 4, 1))
        .with_job(job);

    let picked = select_promotion_candidate(&driver(&ctl)).await.unwrap();
    assert_eq!(picked, None);
}

#[tokio::test(start_paused = true)]
async fn down_partitions_offer_no_capacity() {
    let mut job = test_support::running_job(21, "l1");
    job.partition = "lo".into();

    let mut down = test_support::partition("hi", 100, "h1");
    down.state = sm_core::PartitionState::Down;

    let ctl = FakeController::new()
        .with_partition(down)
        .with_partition(test_support::partition("lo", 10, "l1"))
        .with_node(test_support::node("h1", 4, 0))
        .with_node(test_support::node("l1", 4, 1))
        .with_job(job);

    let picked = select_promotion_candidate(&driver(&ctl)).await.unwrap();
    assert_eq!(picked, None);
}

#[tokio::test(start_paused = true)]
async fn infeasible_probe_rejects_the_candidate() {
    let mut job = test_support::running_job(21, "l1");
    job.partition = "lo".into();

    let ctl = FakeController::new()
        .with_partition(test_support::partition("hi", 100, "h1"))
        .with_partition(test_support::partition("lo", 10, "l1"))
        .with_node(test_support::node("h1", 4, 0))
        .with_node(test_support::node("l1", 4, 1))
        .with_job(job);
    ctl.set_will_run(|desc| desc.partition.as_deref() != Some("hi"));

    let picked = select_promotion_candidate(&driver(&ctl)).await.unwrap();
    assert_eq!(picked, None);
}
