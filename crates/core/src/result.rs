// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-file and per-repository processing outcomes.

use serde::{Deserialize, Serialize};

/// Outcome of applying a rule pack to a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProcessingResult {
    pub original_path: String,
    pub applied_rule_ids: Vec<String>,
    pub lines_changed_count: usize,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileProcessingResult {
    pub fn succeeded(path: impl Into<String>, rule_ids: Vec<String>, lines: usize) -> Self {
        Self {
            original_path: path.into(),
            applied_rule_ids: rule_ids,
            lines_changed_count: lines,
            success: true,
            error: None,
        }
    }

    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            original_path: path.into(),
            applied_rule_ids: Vec::new(),
            lines_changed_count: 0,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregated outcome for one repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryResult {
    pub repo_url: String,
    pub files_matched: usize,
    pub files_modified: usize,
    /// One-line description of what discovery found, for the PR body and chat.
    pub discovery_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_results: Vec<FileProcessingResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl RepositoryResult {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
