// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared tool-client behaviour: catalog, health, retrying calls.

use crate::error::ClientError;
use crate::retry::RetryPolicy;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use sunset_transport::{ToolResponse, Transport};

/// Default upper bound on a single tool call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Base client over one tool server.
///
/// Concrete clients ([`crate::PackerClient`] etc.) are thin typed wrappers
/// over [`ToolClient::call_tool`]. The client is cheap to clone; all clones
/// share the transport and its request serialization.
#[derive(Clone)]
pub struct ToolClient {
    server_name: String,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    call_timeout: Duration,
    catalog: Arc<Mutex<Option<Vec<String>>>>,
}

impl std::fmt::Debug for ToolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolClient")
            .field("server_name", &self.server_name)
            .field("policy", &self.policy)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl ToolClient {
    pub fn new(server_name: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            server_name: server_name.into(),
            transport,
            policy: RetryPolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            catalog: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Tool names advertised by the server. Cached after the first call;
    /// `refresh_tools` forces a reload.
    pub async fn list_available_tools(&self) -> Result<Vec<String>, ClientError> {
        if let Some(cached) = self.catalog.lock().clone() {
            return Ok(cached);
        }
        self.refresh_tools().await
    }

    /// Reload the tool catalog from the server.
    pub async fn refresh_tools(&self) -> Result<Vec<String>, ClientError> {
        let result = self
            .transport
            .call("tools/list", json!({}), self.call_timeout)
            .await?;
        let tools = result
            .get("tools")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|t| t.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .ok_or_else(|| ClientError::invalid_response("tools/list", "missing tools array"))?;
        *self.catalog.lock() = Some(tools.clone());
        Ok(tools)
    }

    /// A `tools/list` round-trip; true when the server answers at all.
    pub async fn health_check(&self) -> bool {
        self.refresh_tools().await.is_ok()
    }

    /// Call a tool with the client's retry policy.
    ///
    /// Transient transport failures and declared-retryable tool errors are
    /// retried with backoff; each retry emits a warning. Deterministic
    /// errors fail on first sight.
    pub async fn call_tool(&self, tool: &str, arguments: Value) -> Result<ToolResponse, ClientError> {
        let params = json!({"name": tool, "arguments": arguments});
        let attempts = self.policy.attempts();

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.policy.delay_for_retry(attempt - 1);
                tracing::warn!(
                    server = %self.server_name,
                    tool,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying tool call"
                );
                tokio::time::sleep(delay).await;
            }

            match self
                .transport
                .call("tools/call", params.clone(), self.call_timeout)
                .await
            {
                Ok(result) => return Ok(ToolResponse::from_result(result)),
                Err(e) if e.is_retryable() => {
                    if attempt == attempts {
                        return Err(ClientError::RetriesExhausted { attempts, last: e });
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ClientError::invalid_response(tool, "no attempts made"))
    }

    /// Call a tool and decode its payload as JSON.
    pub async fn call_tool_json(&self, tool: &str, arguments: Value) -> Result<Value, ClientError> {
        Ok(self.call_tool(tool, arguments).await?.into_value())
    }

    /// Call a tool and return its text payload.
    pub async fn call_tool_text(
        &self,
        tool: &str,
        arguments: Value,
    ) -> Result<String, ClientError> {
        Ok(self.call_tool(tool, arguments).await?.into_text())
    }

    /// Shut the underlying transport down.
    pub async fn shutdown(&self, grace: Duration) {
        self.transport.shutdown(grace).await;
    }
}

#[cfg(test)]
#[path = "base_tests.rs"]
mod tests;
