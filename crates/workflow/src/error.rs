// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build-time and step-level errors.

use std::time::Duration;
use thiserror::Error;

/// Validation failures detected by [`crate::WorkflowBuilder::build`].
///
/// All of these are programming errors in the workflow definition and are
/// fatal before execution begins.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("step {step} depends on unknown step {dependency}")]
    UnknownDependency { step: String, dependency: String },

    #[error("dependency cycle involving steps: {}", ids.join(" → "))]
    Cycle { ids: Vec<String> },

    #[error("step {0} has a zero timeout")]
    ZeroTimeout(String),

    #[error("tool step {0} is missing a server or tool name")]
    MissingTool(String),

    #[error("workflow has no steps")]
    Empty,
}

/// Failures raised from inside a running step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Client(#[from] sunset_clients::ClientError),

    #[error("step timed out after {0:?}")]
    Timeout(Duration),

    #[error("step cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

impl StepError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Timeouts are terminal for the step; other failures consume the
    /// step's retry budget.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepError::Timeout(_) | StepError::Cancelled)
    }
}
