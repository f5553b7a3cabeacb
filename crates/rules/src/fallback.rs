// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule-less fallback processing.
//!
//! Used when the contextual rules engine is disabled or unavailable: a
//! deterministic strategy keyed by file extension, writing results to a
//! sibling `<source>_decommissioned/` tree.

use crate::error::RuleError;
use crate::header::{has_header, header_block, DecommissionOptions};
use regex::Regex;
use std::path::{Path, PathBuf};
use sunset_core::{FileProcessingResult, SourceType};

/// Strategy assignment by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
    Infrastructure,
    Configuration,
    Code,
    Documentation,
}

sunset_core::simple_display! {
    FallbackStrategy {
        Infrastructure => "infrastructure",
        Configuration => "configuration",
        Code => "code",
        Documentation => "documentation",
    }
}

/// Deterministic, pragmatic fallback processor.
pub struct FileDecommissionProcessor {
    options: DecommissionOptions,
    pattern: Regex,
}

impl FileDecommissionProcessor {
    pub fn new(options: DecommissionOptions) -> Self {
        let pattern = Regex::new(&format!(
            r"(?i)\b{}\b",
            regex::escape(&options.database)
        ))
        .unwrap_or_else(|_| unreachable!("escaped identifier is a valid regex"));
        Self { options, pattern }
    }

    /// Strategy for a path, by extension (helm yaml counts as infrastructure).
    pub fn strategy_for(path: &Path) -> FallbackStrategy {
        let lower = path.to_string_lossy().to_ascii_lowercase();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "tf" | "tfvars" => FallbackStrategy::Infrastructure,
            "yaml" | "yml" if lower.contains("helm") || lower.contains("chart") => {
                FallbackStrategy::Infrastructure
            }
            "yaml" | "yml" | "json" => FallbackStrategy::Configuration,
            "py" | "sh" => FallbackStrategy::Code,
            _ => FallbackStrategy::Documentation,
        }
    }

    /// Process every file under `source_dir` into `<source_dir>_decommissioned/`,
    /// preserving the tree. Only files mentioning the database are rewritten;
    /// everything else is copied through unchanged.
    pub fn process_directory(
        &self,
        source_dir: &Path,
    ) -> Result<Vec<FileProcessingResult>, RuleError> {
        let output_root = sibling_output_dir(source_dir);
        let mut results = Vec::new();
        self.walk(source_dir, source_dir, &output_root, &mut results)?;
        Ok(results)
    }

    fn walk(
        &self,
        root: &Path,
        dir: &Path,
        output_root: &Path,
        results: &mut Vec<FileProcessingResult>,
    ) -> Result<(), RuleError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "cannot read directory");
                return Ok(());
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.walk(root, &path, output_root, results)?;
                continue;
            }
            let relative = match path.strip_prefix(root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };
            let destination = output_root.join(&relative);
            if let Some(parent) = destination.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    results.push(FileProcessingResult::failed(
                        relative.display().to_string(),
                        e.to_string(),
                    ));
                    continue;
                }
            }
            results.push(self.process_file(&path, &relative, &destination));
        }
        Ok(())
    }

    fn process_file(
        &self,
        source: &Path,
        relative: &Path,
        destination: &Path,
    ) -> FileProcessingResult {
        let rel = relative.display().to_string();
        let content = match std::fs::read_to_string(source) {
            Ok(content) => content,
            Err(_) => {
                // Binary or unreadable: copy through untouched.
                return match std::fs::copy(source, destination) {
                    Ok(_) => FileProcessingResult::succeeded(rel, vec![], 0),
                    Err(e) => FileProcessingResult::failed(rel, e.to_string()),
                };
            }
        };

        let (output, strategy, lines_changed) = self.transform(relative, &content);
        match std::fs::write(destination, output) {
            Ok(()) => {
                let applied = if lines_changed > 0 {
                    vec![format!("fallback-{strategy}")]
                } else {
                    vec![]
                };
                FileProcessingResult::succeeded(rel, applied, lines_changed)
            }
            Err(e) => FileProcessingResult::failed(rel, e.to_string()),
        }
    }

    /// Transform one file's content without touching the filesystem.
    ///
    /// Returns the rewritten content and the number of changed lines (zero
    /// when the file does not mention the database or is already processed).
    pub fn transform_content(&self, relative: &Path, content: &str) -> (String, usize) {
        let (out, _, changed) = self.transform(relative, content);
        (out, changed)
    }

    fn transform(&self, relative: &Path, content: &str) -> (String, FallbackStrategy, usize) {
        let strategy = Self::strategy_for(relative);
        if !self.pattern.is_match(content) || has_header(content) {
            return (content.to_string(), strategy, 0);
        }

        let (source_type, out, changed) = match strategy {
            FallbackStrategy::Infrastructure | FallbackStrategy::Configuration => {
                let ty = if strategy == FallbackStrategy::Infrastructure {
                    SourceType::Infrastructure
                } else {
                    SourceType::Configuration
                };
                let (out, changed) = self.comment_matching_lines(content, ty);
                (ty, out, changed)
            }
            FallbackStrategy::Code => {
                let ty = if relative.extension().and_then(|e| e.to_str()) == Some("sh") {
                    SourceType::Shell
                } else {
                    SourceType::Python
                };
                let (commented, changed) = self.comment_matching_lines(content, ty);
                let guard = if ty == SourceType::Python {
                    format!(
                        "def connect_to_{}():\n    raise RuntimeError(\"{} was decommissioned on {}; contact {}\")\n\n\n",
                        self.options.database,
                        self.options.database,
                        self.options.date.format("%Y-%m-%d"),
                        self.options.contact,
                    )
                } else {
                    format!(
                        "echo \"{} was decommissioned on {}\" >&2\nexit 1\n\n",
                        self.options.database,
                        self.options.date.format("%Y-%m-%d"),
                    )
                };
                (ty, format!("{guard}{commented}"), changed + 2)
            }
            FallbackStrategy::Documentation => {
                (SourceType::Documentation, content.to_string(), 1)
            }
        };

        let header = header_block(&self.options, source_type);
        let header_lines = header.lines().count();
        (format!("{header}{out}"), strategy, changed + header_lines)
    }

    fn comment_matching_lines(&self, content: &str, ty: SourceType) -> (String, usize) {
        let token = ty.comment_token();
        let mut out = String::with_capacity(content.len());
        let mut changed = 0usize;
        for line in content.lines() {
            if self.pattern.is_match(line) && !line.trim_start().starts_with(token.prefix) {
                let indent = &line[..line.len() - line.trim_start().len()];
                out.push_str(indent);
                out.push_str(&token.wrap(line.trim_start()));
                changed += 1;
            } else {
                out.push_str(line);
            }
            out.push('\n');
        }
        if !content.ends_with('\n') && out.ends_with('\n') {
            out.pop();
        }
        (out, changed)
    }
}

/// `<source>_decommissioned/` next to the source tree.
fn sibling_output_dir(source_dir: &Path) -> PathBuf {
    let name = source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source".to_string());
    source_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{name}_decommissioned"))
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
