// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Matched-file records produced by extraction and enriched downstream.

use crate::source_type::SourceType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One pattern hit inside a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// 1-based line number into the file content.
    pub line_number: usize,
    /// The matched text, verbatim as it appears at that line.
    pub matched_text: String,
    /// Up to two lines above and below the match.
    pub context_lines: Vec<String>,
    /// Combined pattern × classifier confidence, [0, 1].
    #[serde(default)]
    pub confidence: f64,
}

/// A file referencing the target database.
///
/// Produced by the extractor, enriched by the classifier and the discovery
/// engine, consumed by the rules engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedFile {
    /// Path as recorded in the packed archive.
    pub original_path: String,
    /// Quarantine copy on local disk, when one was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_copy_path: Option<PathBuf>,
    pub matches: Vec<PatternMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub framework_hints: Vec<String>,
}

impl MatchedFile {
    pub fn new(original_path: impl Into<String>) -> Self {
        Self {
            original_path: original_path.into(),
            extracted_copy_path: None,
            matches: Vec::new(),
            source_type: None,
            confidence: None,
            framework_hints: Vec::new(),
        }
    }

    /// Highest single-match confidence, or the classifier confidence when no
    /// match carries one.
    pub fn best_confidence(&self) -> f64 {
        self.matches
            .iter()
            .map(|m| m.confidence)
            .fold(self.confidence.unwrap_or(0.0), f64::max)
    }
}

crate::builder! {
    pub struct MatchedFileBuilder => MatchedFile {
        into {
            original_path: String = "app/db.py",
        }
        set {
            matches: Vec<PatternMatch> = Vec::new(),
            framework_hints: Vec<String> = Vec::new(),
        }
        option {
            extracted_copy_path: PathBuf = None,
            source_type: SourceType = None,
            confidence: f64 = None,
        }
    }
}

#[cfg(test)]
#[path = "matched_tests.rs"]
mod tests;
