// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic source-type classification.

use serde::{Deserialize, Serialize};
use sunset_core::SourceType;

/// Confidence tiers, exposed as configuration with locked defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierWeights {
    /// Unambiguous path suffix.
    pub path_exact: f64,
    /// Path suffix confirmed (or overridden) by content.
    pub content_confirmed: f64,
    /// Ambiguous suffix, path evidence only.
    pub path_ambiguous: f64,
}

impl Default for ClassifierWeights {
    fn default() -> Self {
        Self {
            path_exact: 1.0,
            content_confirmed: 0.8,
            path_ambiguous: 0.5,
        }
    }
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub framework_hints: Vec<String>,
    pub confidence: f64,
}

impl Classification {
    fn new(source_type: SourceType, confidence: f64) -> Self {
        Self {
            source_type,
            framework_hints: Vec::new(),
            confidence,
        }
    }

    fn hint(mut self, hint: &str) -> Self {
        self.framework_hints.push(hint.to_string());
        self
    }
}

/// Maps (path, content) to (source type, framework hints, confidence).
///
/// Path suffix rules decide first; content sniffs confirm or override.
#[derive(Debug, Clone, Default)]
pub struct SourceTypeClassifier {
    weights: ClassifierWeights,
}

impl SourceTypeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ClassifierWeights) -> Self {
        Self { weights }
    }

    pub fn classify(&self, path: &str, content: &str) -> Classification {
        let w = &self.weights;
        let lower = path.to_ascii_lowercase();
        let file_name = lower.rsplit('/').next().unwrap_or(&lower).to_string();

        // Helm charts before generic yaml.
        if file_name == "chart.yaml"
            || (file_name.starts_with("values") && file_name.ends_with(".yaml"))
            || lower.contains("templates/")
        {
            if has_suffix(&lower, &[".yaml", ".yml", ".tpl"]) {
                return Classification::new(SourceType::Infrastructure, w.path_exact)
                    .hint("helm");
            }
        }

        if has_suffix(&lower, &[".tf", ".tfvars"]) {
            return Classification::new(SourceType::Infrastructure, w.path_exact)
                .hint("terraform");
        }

        if has_suffix(&lower, &[".sql", ".dump", ".bak"]) {
            return Classification::new(SourceType::Sql, w.path_exact);
        }

        if has_suffix(&lower, &[".py"]) {
            let mut classification =
                Classification::new(SourceType::Python, w.path_exact);
            if content.contains("from django") || content.contains("import django") {
                classification = classification.hint("django");
                classification.confidence = w.content_confirmed;
            } else if content.contains("from flask") || content.contains("import flask") {
                classification = classification.hint("flask");
                classification.confidence = w.content_confirmed;
            }
            return classification;
        }

        if has_suffix(&lower, &[".sh", ".bash"]) {
            return Classification::new(SourceType::Shell, w.path_exact);
        }

        if has_suffix(&lower, &[".yml", ".yaml"]) {
            // Kubernetes manifests are infrastructure, not configuration.
            if content.contains("apiVersion:") && content.contains("kind:") {
                return Classification::new(SourceType::Infrastructure, w.content_confirmed)
                    .hint("kubernetes");
            }
            return Classification::new(SourceType::Configuration, w.path_ambiguous);
        }

        if has_suffix(&lower, &[".json", ".ini", ".toml"]) || file_name.starts_with(".env") {
            return Classification::new(SourceType::Configuration, w.path_exact);
        }

        if has_suffix(&lower, &[".md", ".rst", ".txt"]) {
            return Classification::new(SourceType::Documentation, w.path_exact);
        }

        Classification::new(SourceType::Unknown, 0.0)
    }
}

fn has_suffix(path: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| path.ends_with(s))
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
