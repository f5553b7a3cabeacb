// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The decommissioning header prepended to every modified file.

use chrono::NaiveDate;
use sunset_core::SourceType;

/// Options threaded through every rewrite of one decommissioning run.
#[derive(Debug, Clone)]
pub struct DecommissionOptions {
    pub database: String,
    pub date: NaiveDate,
    pub strategy: String,
    pub ticket: String,
    pub contact: String,
}

impl DecommissionOptions {
    pub fn new(database: &str, date: NaiveDate) -> Self {
        Self {
            database: database.to_string(),
            date,
            strategy: "contextual-rules".to_string(),
            ticket: format!("DB-DECOMM-{database}"),
            contact: "dba-team@example.com".to_string(),
        }
    }

    sunset_core::setters! {
        into {
            strategy: String,
            ticket: String,
            contact: String,
        }
    }
}

/// Marker token that makes header detection unambiguous.
const HEADER_MARK: &str = "DECOMMISSIONED";

/// Build the five-line banner in the comment style of the source type.
///
/// Lines: date, strategy, ticket, contact, and a legend noting that the
/// original content follows as comments.
pub fn header_block(options: &DecommissionOptions, source_type: SourceType) -> String {
    let token = source_type.comment_token();
    let lines = [
        format!("{} {}: {}", HEADER_MARK, options.date.format("%Y-%m-%d"), options.database),
        format!("Strategy: {}", options.strategy),
        format!("Ticket: {}", options.ticket),
        format!("Contact: {}", options.contact),
        "Original content is preserved below as comments where modified.".to_string(),
    ];
    let mut block = String::new();
    for line in lines {
        block.push_str(&token.wrap(&line));
        block.push('\n');
    }
    block
}

/// True when the content already begins with a decommissioning header.
pub fn has_header(content: &str) -> bool {
    content
        .lines()
        .next()
        .map(|first| first.contains(HEADER_MARK))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "header_tests.rs"]
mod tests;
