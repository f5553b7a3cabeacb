// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use sunset_core::FakeClock;

#[test]
fn start_step_is_zeroed() {
    let tracker = ProgressTracker::with_clock(FakeClock::new());
    let update = tracker.start_step("pack", Some(10));
    assert_eq!(update.status, ProgressStatus::Started);
    assert_eq!(update.current, Some(0));
    assert_eq!(update.percent, Some(0.0));
    assert!(update.rate.is_none());
}

#[test]
fn rate_is_delta_over_elapsed() {
    let clock = FakeClock::new();
    let tracker = ProgressTracker::with_clock(clock.clone());
    tracker.start_step("pack", Some(10));

    clock.advance(Duration::from_secs(2));
    let update = tracker.update("pack", 4);

    // 4 items in 2 seconds
    assert!((update.rate.unwrap() - 2.0).abs() < 1e-9);
    assert!((update.percent.unwrap() - 40.0).abs() < 1e-9);
    // 6 remaining at 2/s
    assert!((update.eta_seconds.unwrap() - 3.0).abs() < 1e-9);
}

#[test]
fn rate_uses_previous_update_as_baseline() {
    let clock = FakeClock::new();
    let tracker = ProgressTracker::with_clock(clock.clone());
    tracker.start_step("pack", Some(100));

    clock.advance(Duration::from_secs(1));
    tracker.update("pack", 10);

    clock.advance(Duration::from_secs(1));
    let update = tracker.update("pack", 40);

    // 30 items in the last second, not 40 over two.
    assert!((update.rate.unwrap() - 30.0).abs() < 1e-9);
}

#[test]
fn no_total_means_no_percent_or_eta() {
    let clock = FakeClock::new();
    let tracker = ProgressTracker::with_clock(clock.clone());
    tracker.start_step("scan", None);

    clock.advance(Duration::from_secs(1));
    let update = tracker.update("scan", 5);
    assert!(update.percent.is_none());
    assert!(update.eta_seconds.is_none());
    assert!(update.rate.is_some());
}

#[test]
fn complete_caps_percent_and_drops_state() {
    let clock = FakeClock::new();
    let tracker = ProgressTracker::with_clock(clock.clone());
    tracker.start_step("pack", Some(10));
    clock.advance(Duration::from_secs(1));
    tracker.update("pack", 7);

    let done = tracker.complete("pack", ProgressStatus::Completed);
    assert_eq!(done.percent, Some(100.0));
    assert_eq!(done.current, Some(7));

    // State was dropped; a fresh complete has nothing to report.
    let again = tracker.complete("pack", ProgressStatus::Completed);
    assert_eq!(again.current, Some(0));
}

#[test]
fn failed_step_keeps_partial_percent() {
    let clock = FakeClock::new();
    let tracker = ProgressTracker::with_clock(clock.clone());
    tracker.start_step("apply", Some(4));
    clock.advance(Duration::from_secs(1));
    tracker.update("apply", 1);

    let failed = tracker.complete("apply", ProgressStatus::Failed);
    assert_eq!(failed.status, ProgressStatus::Failed);
    assert!((failed.percent.unwrap() - 25.0).abs() < 1e-9);
}
