// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-word reference extraction from packed archives.

use crate::archive::PackedArchive;
use crate::error::ExtractError;
use regex::Regex;
use std::path::{Path, PathBuf};
use sunset_core::{MatchedFile, PatternMatch};

/// Finds files whose content mentions the database as a whole word
/// (case-insensitive) and quarantines copies for offline inspection.
pub struct DatabaseReferenceExtractor {
    database: String,
    pattern: Regex,
    quarantine_root: Option<PathBuf>,
}

impl DatabaseReferenceExtractor {
    pub fn new(database: &str) -> Self {
        // regex::escape keeps punctuation in database names literal.
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(database)))
            .unwrap_or_else(|_| unreachable!("escaped identifier is a valid regex"));
        Self {
            database: database.to_string(),
            pattern,
            quarantine_root: None,
        }
    }

    /// Write matched files under `root/<database>/<original path>`.
    pub fn with_quarantine_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.quarantine_root = Some(root.into());
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Scan every archive entry; one [`MatchedFile`] per file with hits.
    pub fn extract(&self, archive: &PackedArchive) -> Result<Vec<MatchedFile>, ExtractError> {
        let mut matched = Vec::new();
        for file in &archive.files {
            let matches = self.scan(&file.content);
            if matches.is_empty() {
                continue;
            }

            let mut entry = MatchedFile::new(file.path.clone());
            entry.matches = matches;
            if let Some(root) = &self.quarantine_root {
                match self.quarantine(root, &file.path, &file.content) {
                    Ok(copy) => entry.extracted_copy_path = Some(copy),
                    Err(e) => {
                        tracing::warn!(path = %file.path, error = %e, "quarantine copy failed");
                    }
                }
            }
            matched.push(entry);
        }
        tracing::debug!(
            database = %self.database,
            files = matched.len(),
            "reference extraction complete"
        );
        Ok(matched)
    }

    fn scan(&self, content: &str) -> Vec<PatternMatch> {
        let lines: Vec<&str> = content.lines().collect();
        let mut matches = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            for hit in self.pattern.find_iter(line) {
                let from = index.saturating_sub(2);
                let to = (index + 3).min(lines.len());
                matches.push(PatternMatch {
                    line_number: index + 1,
                    matched_text: hit.as_str().to_string(),
                    context_lines: lines[from..to].iter().map(|l| l.to_string()).collect(),
                    confidence: 0.0,
                });
            }
        }
        matches
    }

    fn quarantine(&self, root: &Path, path: &str, content: &str) -> std::io::Result<PathBuf> {
        let destination = root.join(&self.database).join(path);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&destination, content)?;
        Ok(destination)
    }
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
