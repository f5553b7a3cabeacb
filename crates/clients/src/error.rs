// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use sunset_transport::ProtocolError;
use thiserror::Error;

/// Errors surfaced by tool clients.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Config(#[from] sunset_core::ConfigError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unexpected response from {tool}: {reason}")]
    InvalidResponse { tool: String, reason: String },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: ProtocolError,
    },
}

impl ClientError {
    pub fn invalid_response(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}
