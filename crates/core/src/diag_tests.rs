// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn only_one_guard_at_a_time() {
    let diag = shared_diag();
    let guard = ActiveTickGuard::try_begin(&diag).unwrap();
    assert!(ActiveTickGuard::try_begin(&diag).is_none());
    drop(guard);
    assert!(ActiveTickGuard::try_begin(&diag).is_some());
}

#[test]
fn drop_clears_active_flag_without_stats() {
    let diag = shared_diag();
    let guard = ActiveTickGuard::try_begin(&diag).unwrap();
    drop(guard);
    let stats = diag.lock();
    assert!(!stats.migration_active);
    assert_eq!(stats.cycle_counter, 0);
}

#[test]
fn finish_records_cycle_stats_and_clears_flag() {
    let diag = shared_diag();
    let guard = ActiveTickGuard::try_begin(&diag).unwrap();
    guard.finish(Duration::from_millis(250), 3);

    let guard = ActiveTickGuard::try_begin(&diag).unwrap();
    guard.finish(Duration::from_millis(100), 1);

    let stats = diag.lock();
    assert!(!stats.migration_active);
    assert_eq!(stats.cycle_counter, 2);
    assert_eq!(stats.cycle_last, Duration::from_millis(100));
    assert_eq!(stats.cycle_max, Duration::from_millis(250));
    assert_eq!(stats.cycle_sum, Duration::from_millis(350));
    assert_eq!(stats.last_depth, 1);
}

#[test]
fn flag_clears_even_when_the_worker_panics() {
    let diag = shared_diag();
    let cloned = Arc::clone(&diag);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let _guard = ActiveTickGuard::try_begin(&cloned).unwrap();
        panic!("worker died");
    }));
    assert!(result.is_err());
    assert!(!diag.lock().migration_active);
}

#[test]
fn reconfig_round_trip() {
    let diag = shared_diag();
    assert!(!take_reconfig(&diag));
    request_reconfig(&diag);
    assert!(take_reconfig(&diag));
    assert!(!take_reconfig(&diag));
}
