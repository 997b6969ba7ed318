// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn hosts(list: &Hostlist) -> Vec<&str> {
    list.iter().collect()
}

#[parameterized(
    empty = { "", &[] },
    single = { "n1", &["n1"] },
    plain_list = { "n1,n2,gpu3", &["n1", "n2", "gpu3"] },
    padded_range = { "n[01-04]", &["n01", "n02", "n03", "n04"] },
    unpadded_range = { "n[9-11]", &["n9", "n10", "n11"] },
    range_and_single = { "n[01-02,07]", &["n01", "n02", "n07"] },
    mixed = { "a1,n[1-2],b", &["a1", "n1", "n2", "b"] },
    suffix = { "rack[1-2]n", &["rack1n", "rack2n"] },
)]
fn parse_expands(expr: &str, expected: &[&str]) {
    let list = Hostlist::parse(expr).unwrap();
    assert_eq!(hosts(&list), expected);
}

#[parameterized(
    unmatched_open = { "n[01-04" },
    unmatched_close = { "n01-04]" },
    reversed = { "n[04-01]" },
    not_numeric = { "n[a-b]" },
    empty_part = { "n[1,,3]" },
)]
fn parse_rejects(expr: &str) {
    assert!(Hostlist::parse(expr).is_err());
}

#[test]
fn ranged_string_collapses_adjacent_runs() {
    let list = Hostlist::parse("n01,n02,n03,gpu7,m1").unwrap();
    assert_eq!(list.to_ranged_string(), "n[01-03],gpu7,m1");
}

#[test]
fn ranged_string_round_trips() {
    let expr = "n[01-04],gpu[1-2],login";
    let list = Hostlist::parse(expr).unwrap();
    assert_eq!(Hostlist::parse(&list.to_ranged_string()).unwrap(), list);
}

#[test]
fn ranged_string_does_not_merge_different_widths() {
    let list = Hostlist::parse("n09,n010").unwrap();
    assert_eq!(list.to_ranged_string(), "n09,n010");
}

#[test]
fn push_merge_dedup_preserve_first_occurrence_order() {
    let mut list = Hostlist::parse("n1,n2").unwrap();
    let extra = Hostlist::parse("n2,n3").unwrap();
    list.merge(&extra);
    list.push("n1");
    list.dedup();
    assert_eq!(hosts(&list), &["n1", "n2", "n3"]);
}

#[test]
fn find_and_contains() {
    let list = Hostlist::parse("n[1-3]").unwrap();
    assert_eq!(list.find("n2"), Some(1));
    assert!(list.contains("n3"));
    assert!(!list.contains("n4"));
}

#[test]
fn shift_removes_from_front() {
    let mut list = Hostlist::parse("n[1-2]").unwrap();
    assert_eq!(list.shift().as_deref(), Some("n1"));
    assert_eq!(list.shift().as_deref(), Some("n2"));
    assert_eq!(list.shift(), None);
    assert!(list.is_empty());
}

#[test]
fn count_counts_expanded_hosts() {
    assert_eq!(Hostlist::parse("n[01-08]").unwrap().count(), 8);
}

#[test]
fn serde_round_trips_as_ranged_string() {
    let list = Hostlist::parse("n[01-03],login").unwrap();
    let json = serde_json::to_string(&list).unwrap();
    assert_eq!(json, "\"n[01-03],login\"");
    let back: Hostlist = serde_json::from_str(&json).unwrap();
    assert_eq!(back, list);
}
