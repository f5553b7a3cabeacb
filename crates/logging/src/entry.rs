// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log entry and level vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

sunset_core::simple_display! {
    LogLevel {
        Debug => "DEBUG",
        Info => "INFO",
        Warning => "WARNING",
        Error => "ERROR",
        Critical => "CRITICAL",
    }
}

/// One immutable log record.
///
/// The JSON-line rendering in the file sink is the audit ground truth; every
/// entry round-trips through [`crate::read_entries`] unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the epoch.
    pub timestamp_ms: u64,
    pub workflow_id: String,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl LogEntry {
    pub fn new(
        timestamp_ms: u64,
        workflow_id: impl Into<String>,
        level: LogLevel,
        component: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_ms,
            workflow_id: workflow_id.into(),
            level,
            component: component.into(),
            message: message.into(),
            data: None,
            step_index: None,
            duration_ms: None,
        }
    }

    sunset_core::setters! {
        option {
            step_index: usize,
            duration_ms: u64,
        }
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
