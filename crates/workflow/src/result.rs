// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use sunset_core::ExecutionId;

/// Terminal state of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed {
        output: Value,
        duration_ms: u64,
    },
    Failed {
        error: String,
        retries: u32,
    },
    Skipped {
        reason: String,
    },
}

impl StepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped { .. })
    }
}

/// Terminal state of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Completed,
    Partial,
    Failed,
}

sunset_core::simple_display! {
    WorkflowStatus {
        Completed => "completed",
        Partial => "partial",
        Failed => "failed",
    }
}

/// Summary of one workflow execution.
///
/// Invariant: `completed + failed + skipped == |steps|` on termination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub workflow_id: ExecutionId,
    pub status: WorkflowStatus,
    pub duration_seconds: f64,
    pub step_results: HashMap<String, StepOutcome>,
    /// Completed steps as a percentage of all steps, in [0, 100].
    pub success_rate: f64,
}

impl WorkflowResult {
    pub fn completed_count(&self) -> usize {
        self.step_results.values().filter(|o| o.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.step_results.values().filter(|o| o.is_failed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.step_results.values().filter(|o| o.is_skipped()).count()
    }

    pub fn is_success(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
