// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn job_request_validates() {
    assert!(MigrateRequest::for_job(JobId::new(1)).validate().is_ok());
}

#[test]
fn drain_request_validates() {
    assert!(MigrateRequest::for_drain("n3").validate().is_ok());
}

#[test]
fn both_job_and_drain_is_bad_arg() {
    let mut req = MigrateRequest::for_job(JobId::new(1));
    req.drain_node = Some("n3".into());
    assert!(matches!(req.validate(), Err(MigrateError::BadArg(_))));
}

#[test]
fn neither_job_nor_drain_is_bad_arg() {
    let req = MigrateRequest::default();
    assert!(matches!(req.validate(), Err(MigrateError::BadArg(_))));
}
