// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport trait and error taxonomy.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the transport layer.
///
/// Everything here is transient from the caller's perspective except
/// [`ProtocolError::Rpc`], which carries the server's own error object and
/// is only retryable for declared-retryable codes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("child process exited (status {status:?})")]
    ProcessExited { status: Option<i32> },

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response id {got} does not match request id {want}")]
    IdMismatch { want: u64, got: u64 },

    #[error("server error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport not started")]
    NotStarted,
}

impl ProtocolError {
    /// True for failures worth retrying at the client layer.
    ///
    /// Deterministic server errors do not retry; rate limiting (-32005 in the
    /// tool-server convention, HTTP-ish 429) does.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProtocolError::Spawn { .. } | ProtocolError::NotStarted => false,
            ProtocolError::Rpc { code, .. } => matches!(code, -32005 | 429),
            _ => true,
        }
    }
}

/// A bidirectional request/response channel to one tool server.
///
/// Implementations serialize requests internally: at most one call is in
/// flight per instance, so responses can never interleave on the wire.
/// Higher-level parallelism uses multiple instances.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one JSON-RPC request and await the matching response `result`.
    async fn call(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ProtocolError>;

    /// Close the channel, terminating the child if one exists.
    async fn shutdown(&self, grace: Duration);
}
