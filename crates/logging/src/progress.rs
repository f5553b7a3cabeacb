// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress tracking with rate and ETA estimation.

use crate::payload::{ProgressStatus, ProgressUpdate};
use parking_lot::Mutex;
use std::collections::HashMap;
use sunset_core::{Clock, SystemClock};

struct StepProgress {
    total: Option<u64>,
    current: u64,
    last_current: u64,
    last_ms: u64,
    rate: Option<f64>,
}

/// Tracks per-step progress and derives rate/ETA between updates.
///
/// Rate is `(current − prev_current) / (now − prev_time)`; ETA is
/// `(total − current) / rate` once a positive rate exists.
pub struct ProgressTracker<C: Clock = SystemClock> {
    clock: C,
    steps: Mutex<HashMap<String, StepProgress>>,
}

impl ProgressTracker<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ProgressTracker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ProgressTracker<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            steps: Mutex::new(HashMap::new()),
        }
    }

    /// Begin tracking a step.
    pub fn start_step(&self, name: &str, total: Option<u64>) -> ProgressUpdate {
        let now = self.clock.epoch_ms();
        self.steps.lock().insert(
            name.to_string(),
            StepProgress {
                total,
                current: 0,
                last_current: 0,
                last_ms: now,
                rate: None,
            },
        );
        ProgressUpdate {
            step_name: name.to_string(),
            status: ProgressStatus::Started,
            percent: total.map(|_| 0.0),
            eta_seconds: None,
            current: Some(0),
            total,
            rate: None,
        }
    }

    /// Record new progress and recompute rate/ETA.
    pub fn update(&self, name: &str, current: u64) -> ProgressUpdate {
        let now = self.clock.epoch_ms();
        let mut steps = self.steps.lock();
        let state = steps.entry(name.to_string()).or_insert(StepProgress {
            total: None,
            current: 0,
            last_current: 0,
            last_ms: now,
            rate: None,
        });

        let elapsed_s = (now.saturating_sub(state.last_ms)) as f64 / 1000.0;
        if elapsed_s > 0.0 {
            let delta = current.saturating_sub(state.last_current) as f64;
            state.rate = Some(delta / elapsed_s);
            state.last_current = current;
            state.last_ms = now;
        }
        state.current = current;

        let percent = state
            .total
            .filter(|t| *t > 0)
            .map(|t| (current as f64 / t as f64 * 100.0).min(100.0));
        let eta_seconds = match (state.total, state.rate) {
            (Some(total), Some(rate)) if rate > 0.0 => {
                Some(total.saturating_sub(current) as f64 / rate)
            }
            _ => None,
        };

        ProgressUpdate {
            step_name: name.to_string(),
            status: ProgressStatus::Progress,
            percent,
            eta_seconds,
            current: Some(current),
            total: state.total,
            rate: state.rate,
        }
    }

    /// Finish a step, dropping its state.
    pub fn complete(&self, name: &str, status: ProgressStatus) -> ProgressUpdate {
        let state = self.steps.lock().remove(name);
        let (current, total) = state
            .map(|s| (s.current, s.total))
            .unwrap_or((0, None));
        ProgressUpdate {
            step_name: name.to_string(),
            status,
            percent: match status {
                ProgressStatus::Completed => Some(100.0),
                _ => total
                    .filter(|t| *t > 0)
                    .map(|t| (current as f64 / t as f64 * 100.0).min(100.0)),
            },
            eta_seconds: None,
            current: Some(current),
            total,
            rate: None,
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
