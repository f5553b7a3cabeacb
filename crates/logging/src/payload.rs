// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured payloads carried in log entries and rendered by the UI.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Progress lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Started,
    Progress,
    Completed,
    Failed,
}

sunset_core::simple_display! {
    ProgressStatus {
        Started => "started",
        Progress => "progress",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Tabular payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// One node of a tree payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

/// A progress snapshot for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub step_name: String,
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Items per second since the previous update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

/// Discriminated payload union.
///
/// Open maps in the source system become explicit variants here; `KeyValue`
/// is the free-form escape hatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Table {
        title: String,
        #[serde(flatten)]
        table: TableData,
    },
    Tree {
        title: String,
        roots: Vec<TreeNode>,
    },
    Metrics {
        title: String,
        values: BTreeMap<String, f64>,
    },
    Progress(ProgressUpdate),
    KeyValue {
        title: String,
        values: BTreeMap<String, Value>,
    },
}

impl Payload {
    pub fn title(&self) -> &str {
        match self {
            Payload::Table { title, .. }
            | Payload::Tree { title, .. }
            | Payload::Metrics { title, .. }
            | Payload::KeyValue { title, .. } => title,
            Payload::Progress(update) => &update.step_name,
        }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
