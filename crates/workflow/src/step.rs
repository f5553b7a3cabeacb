// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step definitions.

use crate::error::StepError;
use serde_json::Value;
use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by custom step bodies.
pub type StepFuture = Pin<Box<dyn Future<Output = Result<Value, StepError>> + Send>>;

/// A custom step body.
///
/// Deliberately a plain function pointer: bodies must be named, module-scope
/// routines taking everything they need from the [`crate::StepContext`]
/// parameters map. Capturing closures defeat step traceability and any
/// future checkpoint/replay of step definitions.
pub type StepFn = fn(crate::StepContext) -> StepFuture;

/// What a step does when it runs.
#[derive(Clone)]
pub enum StepKind {
    /// Call `tool_name` on `server_name` with the step's parameters.
    Tool {
        server_name: String,
        tool_name: String,
    },
    /// Run a named custom routine.
    Custom { func: StepFn },
    /// Run a named routine; a literal `false` result skips direct dependents.
    Conditional { func: StepFn },
}

impl std::fmt::Debug for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::Tool {
                server_name,
                tool_name,
            } => write!(f, "Tool({server_name}/{tool_name})"),
            StepKind::Custom { .. } => write!(f, "Custom"),
            StepKind::Conditional { .. } => write!(f, "Conditional"),
        }
    }
}

/// One schedulable unit of a workflow.
#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub id: String,
    pub name: String,
    pub kind: StepKind,
    /// Step parameters; custom bodies read their inputs here.
    pub parameters: Value,
    pub depends_on: BTreeSet<String>,
    /// None means "use the workflow default".
    pub timeout: Option<Duration>,
    pub retry_count: Option<u32>,
    /// Fixed delay before the first attempt.
    pub delay: Duration,
}

impl WorkflowStep {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            parameters: Value::Null,
            depends_on: BTreeSet::new(),
            timeout: None,
            retry_count: None,
            delay: Duration::ZERO,
        }
    }

    pub fn parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.depends_on = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_count(mut self, retries: u32) -> Self {
        self.retry_count = Some(retries);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}
