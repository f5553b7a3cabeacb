// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared per-execution state.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use sunset_clients::ClientRegistry;
use sunset_logging::StructuredLogger;

/// Per-execution state shared by every step.
///
/// Three sub-spaces: `step_results` (engine-written, read-only for steps),
/// `shared_values` (free read/write between steps; writers namespace their
/// keys per step to avoid races), and the client registry (in-memory only,
/// never serialized). Dependency edges are the only happens-before between
/// writers and readers.
pub struct WorkflowContext {
    step_results: Mutex<HashMap<String, Value>>,
    shared_values: Mutex<HashMap<String, Value>>,
    clients: Mutex<Option<Arc<ClientRegistry>>>,
    logger: StructuredLogger,
}

impl WorkflowContext {
    pub fn new(logger: StructuredLogger) -> Self {
        Self {
            step_results: Mutex::new(HashMap::new()),
            shared_values: Mutex::new(HashMap::new()),
            clients: Mutex::new(None),
            logger,
        }
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Result of a completed dependency.
    pub fn step_result(&self, step_id: &str) -> Option<Value> {
        self.step_results.lock().get(step_id).cloned()
    }

    /// Engine-only: record a completed step's output.
    pub(crate) fn record_step_result(&self, step_id: &str, value: Value) {
        self.step_results.lock().insert(step_id.to_string(), value);
    }

    pub fn set_shared(&self, key: &str, value: Value) {
        self.shared_values.lock().insert(key.to_string(), value);
    }

    pub fn shared(&self, key: &str) -> Option<Value> {
        self.shared_values.lock().get(key).cloned()
    }

    /// All shared values with keys under `prefix`, in key order.
    pub fn shared_with_prefix(&self, prefix: &str) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = self
            .shared_values
            .lock()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn set_clients(&self, registry: Arc<ClientRegistry>) {
        *self.clients.lock() = Some(registry);
    }

    pub fn clients(&self) -> Option<Arc<ClientRegistry>> {
        self.clients.lock().clone()
    }
}

/// A step's view of the workflow: its own definition plus the shared context.
#[derive(Clone)]
pub struct StepContext {
    pub(crate) step_id: String,
    pub(crate) parameters: Value,
    pub(crate) context: Arc<WorkflowContext>,
    pub(crate) cancel: tokio_util::sync::CancellationToken,
}

impl StepContext {
    pub fn step_id(&self) -> &str {
        &self.step_id
    }

    /// The step's `parameters` map.
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// A required string parameter.
    pub fn param_str(&self, key: &str) -> Result<String, crate::StepError> {
        self.parameters
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| crate::StepError::failed(format!("missing parameter: {key}")))
    }

    pub fn context(&self) -> &Arc<WorkflowContext> {
        &self.context
    }

    pub fn logger(&self) -> &StructuredLogger {
        self.context.logger()
    }

    /// Cooperative cancellation signal for long-running bodies.
    pub fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel_token(&self) -> &tokio_util::sync::CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
