// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration error taxonomy.
//!
//! Configuration errors are fatal: they surface immediately and map to
//! exit code 1 in the driver. Transient failures live in the transport
//! and client crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("malformed server config {path}: {reason}")]
    MalformedServerConfig { path: String, reason: String },

    #[error("server name {0:?} must use the ovr_ prefix")]
    BadServerName(String),

    #[error("unknown server: {0}")]
    UnknownServer(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
