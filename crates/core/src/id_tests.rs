// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn job_id_round_trips_through_display_and_parse() {
    let id = JobId::new(42);
    assert_eq!(id.to_string(), "42");
    assert_eq!("42".parse::<JobId>().unwrap(), id);
}

#[test]
fn step_id_parses_from_str() {
    assert_eq!("7".parse::<StepId>().unwrap(), StepId::new(7));
    assert!("x7".parse::<StepId>().is_err());
}

#[test]
fn ids_serialize_transparently() {
    let json = serde_json::to_string(&JobId::new(99)).unwrap();
    assert_eq!(json, "99");
    let back: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, JobId::new(99));
}
