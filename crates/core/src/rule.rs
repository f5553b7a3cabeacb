// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transformation rules applied to matched files.

use crate::source_type::SourceType;
use serde::{Deserialize, Serialize};

/// What a rule applies to: a source type, a framework tag, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTarget {
    SourceType(SourceType),
    Framework(String),
}

/// The transformation a rule performs on matched lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Prefix matched lines with the comment token, preserving indentation.
    CommentOut,
    /// Physically remove matched lines.
    DeleteLine,
    /// Insert a single comment line directly above the match.
    InsertDeprecationNotice,
    /// Replace the enclosing function body with a raise (Python only).
    ReplaceWithException,
    /// Prepend the decommissioning header block.
    PrependHeader,
}

crate::simple_display! {
    RuleAction {
        CommentOut => "comment_out",
        DeleteLine => "delete_line",
        InsertDeprecationNotice => "insert_deprecation_notice",
        ReplaceWithException => "replace_with_exception",
        PrependHeader => "prepend_header",
    }
}

/// A single transformation rule.
///
/// Rules within one pack have a total priority order; lower `priority` runs
/// first. The `pattern` is a regex parameterised by the database name at pack
/// construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub applies_to: Vec<RuleTarget>,
    pub pattern: String,
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_template: Option<String>,
    pub priority: u32,
}

impl Rule {
    pub fn applies_to_source(&self, ty: SourceType) -> bool {
        self.applies_to
            .iter()
            .any(|t| matches!(t, RuleTarget::SourceType(s) if *s == ty))
    }

    pub fn applies_to_framework(&self, hint: &str) -> bool {
        self.applies_to
            .iter()
            .any(|t| matches!(t, RuleTarget::Framework(f) if f == hint))
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
