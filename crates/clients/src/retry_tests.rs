// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_match_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.base_delay, Duration::from_secs(1));
    assert_eq!(policy.max_delay, Duration::from_secs(30));
    assert!((policy.factor - 2.0).abs() < f64::EPSILON);
    assert!((policy.jitter - 0.2).abs() < f64::EPSILON);
}

#[test]
fn none_never_retries() {
    let policy = RetryPolicy::none();
    assert_eq!(policy.max_retries, 0);
    assert_eq!(policy.attempts(), 1);
}

#[test]
fn delays_grow_exponentially_without_jitter() {
    let policy = RetryPolicy::default().jitter(0.0);
    assert_eq!(policy.delay_for_retry(0), Duration::ZERO);
    assert_eq!(policy.delay_for_retry(1), Duration::from_secs(1));
    assert_eq!(policy.delay_for_retry(2), Duration::from_secs(2));
    assert_eq!(policy.delay_for_retry(3), Duration::from_secs(4));
}

#[test]
fn delay_is_capped() {
    let policy = RetryPolicy::default()
        .jitter(0.0)
        .max_delay(Duration::from_secs(5));
    assert_eq!(policy.delay_for_retry(10), Duration::from_secs(5));
}

#[test]
fn jitter_stays_within_spread() {
    let policy = RetryPolicy::default().jitter(0.2);
    for _ in 0..100 {
        let delay = policy.delay_for_retry(1).as_secs_f64();
        assert!((0.8..=1.2).contains(&delay), "delay out of range: {delay}");
    }
}

#[test]
fn jitter_is_clamped() {
    let policy = RetryPolicy::default().jitter(7.0);
    assert!((policy.jitter - 1.0).abs() < f64::EPSILON);
}
