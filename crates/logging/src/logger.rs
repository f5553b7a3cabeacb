// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-workflow structured logger facade.

use crate::console::ConsoleSink;
use crate::entry::{LogEntry, LogLevel};
use crate::file_sink::RotatingFileSink;
use crate::payload::{Payload, ProgressStatus};
use crate::progress::ProgressTracker;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use sunset_core::{Clock, ParameterConfig, SystemClock};

struct Inner<C: Clock> {
    workflow_id: String,
    clock: C,
    file: Option<Arc<RotatingFileSink>>,
    console: Option<Arc<ConsoleSink>>,
    progress: ProgressTracker<C>,
}

/// One logger instance per workflow execution.
///
/// Entries fan out to the JSON file sink (audit ground truth) and the
/// console sink (human view). Cloning is cheap; clones share sinks and
/// progress state.
pub struct StructuredLogger<C: Clock = SystemClock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for StructuredLogger<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl StructuredLogger<SystemClock> {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self::with_clock(workflow_id, SystemClock)
    }
}

impl<C: Clock> StructuredLogger<C> {
    pub fn with_clock(workflow_id: impl Into<String>, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                workflow_id: workflow_id.into(),
                clock: clock.clone(),
                file: None,
                console: None,
                progress: ProgressTracker::with_clock(clock),
            }),
        }
    }

    pub fn with_file_sink(self, sink: RotatingFileSink) -> Self {
        self.map_inner(|inner| inner.file = Some(Arc::new(sink)))
    }

    pub fn with_console_sink(self, sink: ConsoleSink) -> Self {
        self.map_inner(|inner| inner.console = Some(Arc::new(sink)))
    }

    fn map_inner(self, f: impl FnOnce(&mut Inner<C>)) -> Self {
        // Builder-time only: no clones exist yet.
        match Arc::try_unwrap(self.inner) {
            Ok(mut inner) => {
                f(&mut inner);
                Self {
                    inner: Arc::new(inner),
                }
            }
            Err(inner) => Self { inner },
        }
    }

    pub fn workflow_id(&self) -> &str {
        &self.inner.workflow_id
    }

    fn entry(
        &self,
        level: LogLevel,
        component: &str,
        message: impl Into<String>,
    ) -> LogEntry {
        LogEntry::new(
            self.inner.clock.epoch_ms(),
            self.inner.workflow_id.clone(),
            level,
            component,
            message,
        )
    }

    fn emit(&self, entry: LogEntry) {
        if let Some(file) = &self.inner.file {
            file.write(&entry);
        }
        if let Some(console) = &self.inner.console {
            console.write(&entry);
        }
    }

    fn emit_file_only(&self, entry: LogEntry) {
        if let Some(file) = &self.inner.file {
            file.write(&entry);
        }
    }

    /// Core logging call.
    pub fn log(&self, level: LogLevel, component: &str, message: &str, data: Option<Value>) {
        let mut entry = self.entry(level, component, message);
        entry.data = data;
        self.emit(entry);
    }

    pub fn debug(&self, component: &str, message: &str) {
        self.log(LogLevel::Debug, component, message, None);
    }

    pub fn info(&self, component: &str, message: &str) {
        self.log(LogLevel::Info, component, message, None);
    }

    pub fn warning(&self, component: &str, message: &str) {
        self.log(LogLevel::Warning, component, message, None);
    }

    pub fn error(&self, component: &str, message: &str, data: Option<Value>) {
        self.log(LogLevel::Error, component, message, data);
    }

    /// Log a structured payload at INFO.
    pub fn log_payload(&self, component: &str, payload: &Payload) {
        let data = match serde_json::to_value(payload) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize payload");
                return;
            }
        };
        let entry = self
            .entry(LogLevel::Info, component, payload.title())
            .data(data);
        self.emit(entry);
    }

    pub fn log_table(&self, component: &str, payload: &Payload) {
        self.log_payload(component, payload);
    }

    pub fn log_tree(&self, component: &str, payload: &Payload) {
        self.log_payload(component, payload);
    }

    pub fn log_metrics(&self, component: &str, title: &str, values: BTreeMap<String, f64>) {
        self.log_payload(
            component,
            &Payload::Metrics {
                title: title.to_string(),
                values,
            },
        );
    }

    /// Step lifecycle markers used by the workflow engine.
    pub fn log_step_start(&self, step_index: usize, step_name: &str) {
        let entry = self
            .entry(LogLevel::Info, "workflow", format!("step started: {step_name}"))
            .step_index(step_index);
        self.emit(entry);
    }

    pub fn log_step_complete(
        &self,
        step_index: usize,
        step_name: &str,
        duration_ms: u64,
        success: bool,
    ) {
        let (level, verdict) = if success {
            (LogLevel::Info, "completed")
        } else {
            (LogLevel::Error, "failed")
        };
        let entry = self
            .entry(level, "workflow", format!("step {verdict}: {step_name}"))
            .step_index(step_index)
            .duration_ms(duration_ms);
        self.emit(entry);
    }

    /// Progress tracking: every update emits a fresh progress payload.
    pub fn start_step(&self, step_name: &str, total: Option<u64>) {
        let update = self.inner.progress.start_step(step_name, total);
        self.log_payload("progress", &Payload::Progress(update));
    }

    pub fn update_progress(&self, step_name: &str, current: u64) {
        let update = self.inner.progress.update(step_name, current);
        self.log_payload("progress", &Payload::Progress(update));
    }

    pub fn complete_step(&self, step_name: &str, status: ProgressStatus) {
        let update = self.inner.progress.complete(step_name, status);
        self.log_payload("progress", &Payload::Progress(update));
    }

    /// Environment summary policy: one line for humans, the full parameter
    /// dump only for the audit file.
    pub fn log_environment(&self, config: &ParameterConfig, server_health: &[(String, bool)]) {
        self.log_environment_snapshot(
            config.parameter_count(),
            config.secret_count(),
            &config.display_entries(),
            server_health,
        );
    }

    /// Same policy over an already-redacted snapshot (steps carry this form
    /// in their serializable parameters).
    pub fn log_environment_snapshot(
        &self,
        parameter_count: usize,
        secret_count: usize,
        entries: &[(String, String)],
        server_health: &[(String, bool)],
    ) {
        let healthy = server_health.iter().filter(|(_, ok)| *ok).count();
        let summary = format!(
            "📊 Environment validated: {} parameters, {} secrets, {}/{} servers healthy",
            parameter_count,
            secret_count,
            healthy,
            server_health.len(),
        );
        self.log(LogLevel::Info, "environment", &summary, None);

        let values: BTreeMap<String, Value> = entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .chain(
                server_health
                    .iter()
                    .map(|(name, ok)| (format!("server:{name}"), Value::Bool(*ok))),
            )
            .collect();
        let payload = Payload::KeyValue {
            title: "environment".to_string(),
            values,
        };
        if let Ok(data) = serde_json::to_value(&payload) {
            let entry = self
                .entry(LogLevel::Debug, "environment", "environment parameters")
                .data(data);
            self.emit_file_only(entry);
        }
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
