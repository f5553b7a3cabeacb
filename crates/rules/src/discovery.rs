// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pattern discovery: match, classify, and score files in a packed archive.

use crate::archive::PackedArchive;
use crate::classifier::SourceTypeClassifier;
use crate::patterns::{patterns_for, DiscoveryWeights};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sunset_core::{MatchedFile, PatternMatch, SourceType};

/// Aggregate view of one discovery run, for chat messages and PR bodies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverySummary {
    pub files_matched: usize,
    pub total_matches: usize,
    pub by_source_type: BTreeMap<String, usize>,
}

impl DiscoverySummary {
    pub fn one_line(&self) -> String {
        let breakdown: Vec<String> = self
            .by_source_type
            .iter()
            .map(|(ty, n)| format!("{ty}: {n}"))
            .collect();
        format!(
            "{} matches across {} files ({})",
            self.total_matches,
            self.files_matched,
            breakdown.join(", ")
        )
    }
}

/// Consumes a packed archive and produces classified, scored matches.
pub struct PatternDiscoveryEngine {
    database: String,
    classifier: SourceTypeClassifier,
    weights: DiscoveryWeights,
}

impl PatternDiscoveryEngine {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            classifier: SourceTypeClassifier::new(),
            weights: DiscoveryWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: DiscoveryWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Scan the archive: classify each file, run the pattern set applicable
    /// to its source type, and score every match.
    ///
    /// Matches inside string literals count; matches on comment lines are
    /// reported but downweighted. Files the packer marked unreadable never
    /// reach this point (the archive parser drops them).
    pub fn discover(&self, archive: &PackedArchive) -> (Vec<MatchedFile>, DiscoverySummary) {
        let mut matched_files = Vec::new();
        let mut summary = DiscoverySummary::default();

        for file in &archive.files {
            let classification = self.classifier.classify(&file.path, &file.content);
            let specs = patterns_for(&self.database, classification.source_type);
            let comment_prefix = comment_prefix(classification.source_type);

            let lines: Vec<&str> = file.content.lines().collect();
            let mut matches: Vec<PatternMatch> = Vec::new();

            for (index, line) in lines.iter().enumerate() {
                let mut best: Option<(f64, &str)> = None;
                for spec in &specs {
                    if let Some(hit) = spec.regex.find(line) {
                        let candidate = (spec.strength, hit.as_str());
                        if best.map(|(s, _)| candidate.0 > s).unwrap_or(true) {
                            best = Some(candidate);
                        }
                    }
                }
                let Some((strength, text)) = best else {
                    continue;
                };

                let mut confidence = strength * classification.confidence.max(0.1);
                if is_comment_line(line, comment_prefix) {
                    confidence *= self.weights.comment_multiplier;
                }

                let from = index.saturating_sub(2);
                let to = (index + 3).min(lines.len());
                matches.push(PatternMatch {
                    line_number: index + 1,
                    matched_text: text.to_string(),
                    context_lines: lines[from..to].iter().map(|l| l.to_string()).collect(),
                    confidence,
                });
            }

            if matches.is_empty() {
                continue;
            }

            summary.files_matched += 1;
            summary.total_matches += matches.len();
            *summary
                .by_source_type
                .entry(classification.source_type.to_string())
                .or_insert(0) += matches.len();

            let mut entry = MatchedFile::new(file.path.clone());
            entry.matches = matches;
            entry.source_type = Some(classification.source_type);
            entry.confidence = Some(classification.confidence);
            entry.framework_hints = classification.framework_hints;
            matched_files.push(entry);
        }

        tracing::debug!(
            database = %self.database,
            files = summary.files_matched,
            matches = summary.total_matches,
            "discovery complete"
        );
        (matched_files, summary)
    }
}

fn comment_prefix(source_type: SourceType) -> &'static str {
    source_type.comment_token().prefix
}

fn is_comment_line(line: &str, prefix: &str) -> bool {
    line.trim_start().starts_with(prefix)
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
