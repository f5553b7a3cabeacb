// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule packs: the ordered transformation set per source type.

use sunset_core::{Rule, RuleAction, RuleTarget, SourceType};

fn rule(
    id: &str,
    ty: SourceType,
    database: &str,
    action: RuleAction,
    priority: u32,
) -> Rule {
    Rule {
        id: id.to_string(),
        applies_to: vec![RuleTarget::SourceType(ty)],
        pattern: format!(r"(?i)\b{}\b", regex::escape(database)),
        action,
        replacement_template: None,
        priority,
    }
}

/// The ordered rule pack for one source type.
///
/// Packs always end with the header rule; transformation rules run first so
/// the header lands on the final content exactly once.
pub fn rule_pack(database: &str, source_type: SourceType) -> Vec<Rule> {
    let mut pack = match source_type {
        SourceType::Infrastructure => vec![rule(
            "infra-comment-block",
            source_type,
            database,
            RuleAction::CommentOut,
            10,
        )],
        SourceType::Configuration => vec![rule(
            "config-comment",
            source_type,
            database,
            RuleAction::CommentOut,
            10,
        )],
        SourceType::Sql => vec![rule(
            "sql-comment",
            source_type,
            database,
            RuleAction::CommentOut,
            10,
        )],
        SourceType::Python => vec![rule(
            "py-raise",
            source_type,
            database,
            RuleAction::ReplaceWithException,
            10,
        )],
        SourceType::Shell => vec![rule(
            "shell-comment",
            source_type,
            database,
            RuleAction::CommentOut,
            10,
        )],
        SourceType::Documentation => vec![rule(
            "doc-notice",
            source_type,
            database,
            RuleAction::InsertDeprecationNotice,
            10,
        )],
        SourceType::Mixed | SourceType::Unknown => vec![rule(
            "generic-comment",
            source_type,
            database,
            RuleAction::CommentOut,
            10,
        )],
    };
    pack.push(rule(
        "header",
        source_type,
        database,
        RuleAction::PrependHeader,
        100,
    ));
    pack.sort_by_key(|r| r.priority);
    pack
}

#[cfg(test)]
#[path = "packs_tests.rs"]
mod tests;
