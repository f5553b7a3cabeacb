// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source-type classification vocabulary.

use serde::{Deserialize, Serialize};

/// Closed set of source categories a matched file can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Infrastructure,
    Configuration,
    Sql,
    Python,
    Shell,
    Documentation,
    Mixed,
    Unknown,
}

crate::simple_display! {
    SourceType {
        Infrastructure => "infrastructure",
        Configuration => "configuration",
        Sql => "sql",
        Python => "python",
        Shell => "shell",
        Documentation => "documentation",
        Mixed => "mixed",
        Unknown => "unknown",
    }
}

/// Line-comment syntax for a source type.
///
/// `prefix` starts a comment line; `suffix` closes it for bracketed styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentToken {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl CommentToken {
    /// Wrap a single line in this comment style, preserving nothing else.
    pub fn wrap(&self, line: &str) -> String {
        if self.suffix.is_empty() {
            format!("{} {}", self.prefix, line)
        } else {
            format!("{} {} {}", self.prefix, line, self.suffix)
        }
    }
}

impl SourceType {
    /// The comment token used when commenting out or annotating lines.
    pub fn comment_token(&self) -> CommentToken {
        match self {
            SourceType::Infrastructure
            | SourceType::Configuration
            | SourceType::Python
            | SourceType::Shell
            | SourceType::Mixed
            | SourceType::Unknown => CommentToken { prefix: "#", suffix: "" },
            SourceType::Sql => CommentToken { prefix: "--", suffix: "" },
            SourceType::Documentation => CommentToken { prefix: "<!--", suffix: "-->" },
        }
    }
}

#[cfg(test)]
#[path = "source_type_tests.rs"]
mod tests;
