// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quality-assurance checks over accumulated repository results.

use serde::{Deserialize, Serialize};

/// Verdict of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

sunset_core::simple_display! {
    CheckStatus {
        Pass => "pass",
        Warning => "warning",
        Fail => "fail",
    }
}

/// One named check with its verdict and a short diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaCheck {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl QaCheck {
    pub fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

/// All checks plus the combined score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaReport {
    pub checks: Vec<QaCheck>,
}

impl QaReport {
    pub fn push(&mut self, check: QaCheck) {
        self.checks.push(check);
    }

    /// pass = 1, warning = ½, fail = 0, averaged to [0, 100].
    pub fn score(&self) -> f64 {
        if self.checks.is_empty() {
            return 100.0;
        }
        let total: f64 = self
            .checks
            .iter()
            .map(|c| match c.status {
                CheckStatus::Pass => 1.0,
                CheckStatus::Warning => 0.5,
                CheckStatus::Fail => 0.0,
            })
            .sum();
        total / self.checks.len() as f64 * 100.0
    }

    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }
}

#[cfg(test)]
#[path = "qa_tests.rs"]
mod tests;
