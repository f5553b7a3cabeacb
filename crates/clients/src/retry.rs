// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with jitter for tool calls.

use rand::Rng;
use std::time::Duration;

/// Retry configuration for transport-level failures.
///
/// Defaults: 3 retries, 1 s base delay, 2× factor, ±20 % jitter, 30 s cap.
/// Retries apply only to transient errors; deterministic tool errors fail
/// immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    /// Jitter fraction in [0, 1]; 0.2 means ±20 %.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            factor: 2.0,
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            factor: 1.0,
            jitter: 0.0,
        }
    }

    sunset_core::setters! {
        set {
            max_retries: u32,
            base_delay: Duration,
            max_delay: Duration,
            factor: f64,
        }
    }

    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let base = self.base_delay.as_secs_f64() * self.factor.powi(retry as i32 - 1);
        let capped = base.min(self.max_delay.as_secs_f64());
        let jittered = if self.jitter > 0.0 {
            let spread = capped * self.jitter;
            let offset = rand::thread_rng().gen_range(-spread..=spread);
            (capped + offset).max(0.0)
        } else {
            capped
        };
        Duration::from_secs_f64(jittered)
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
