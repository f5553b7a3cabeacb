// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failures while parsing a packed archive or writing quarantine copies.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read archive {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed archive: {0}")]
    Malformed(String),
}

/// A rule failed to apply to one file.
///
/// Rule errors never abort a repository: the file is skipped with the error
/// recorded in its processing result.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("file is not valid UTF-8")]
    NotUtf8,

    #[error("rule {rule_id} found no anchor in {path}")]
    NoAnchor { rule_id: String, path: String },

    #[error("invalid pattern in rule {rule_id}: {reason}")]
    BadPattern { rule_id: String, reason: String },

    #[error(transparent)]
    Client(#[from] sunset_clients::ClientError),
}
