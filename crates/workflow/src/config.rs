// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow-level configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by every step of one workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub name: String,
    pub description: String,
    /// Upper bound on concurrently running steps. Never below 1.
    pub max_parallel_steps: usize,
    pub default_timeout: Duration,
    pub default_retry_count: u32,
    /// When true, the first failure drains the in-flight cohort and aborts
    /// the remaining steps. When false, only dependents of the failure are
    /// skipped.
    pub stop_on_error: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            name: "workflow".to_string(),
            description: String::new(),
            max_parallel_steps: 4,
            default_timeout: Duration::from_secs(120),
            default_retry_count: 3,
            stop_on_error: false,
        }
    }
}

impl WorkflowConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    sunset_core::setters! {
        into {
            description: String,
        }
        set {
            default_timeout: Duration,
            default_retry_count: u32,
            stop_on_error: bool,
        }
    }

    pub fn max_parallel_steps(mut self, n: usize) -> Self {
        self.max_parallel_steps = n.max(1);
        self
    }
}
