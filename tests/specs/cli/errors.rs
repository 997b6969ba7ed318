//! Specs: argument validation and failure exit codes.

use crate::prelude::*;

#[test]
fn no_target_is_a_bad_request() {
    let output = smigrate(&["--test"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid migration request"));
}

#[test]
fn job_and_drain_together_are_a_bad_request() {
    let output = smigrate(&["--jobid", "1", "--drain-node", "n3"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("both a job id and a drain node"));
}

#[test]
fn malformed_hostlist_is_a_bad_request() {
    let output = smigrate(&["--jobid", "1", "--nodes", "n[1-"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("bad hostlist"));
}

#[test]
fn unreachable_controller_is_a_generic_failure() {
    let output = smigrate(&[
        "--jobid",
        "1",
        "--socket",
        "/nonexistent/smig/ctld.sock",
    ]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("migration failed"));
}

#[test]
fn unknown_flags_are_rejected_by_the_parser() {
    let output = smigrate(&["--frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
}
