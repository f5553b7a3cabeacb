// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat client. Advisory by contract: every operation fails softly.

use crate::base::ToolClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Soft outcome of a chat operation.
///
/// Chat is advisory; an outage must never block the pipeline. Errors are
/// folded into `{ok: false, error}` and the caller continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatOutcome {
    fn success(ts: Option<String>) -> Self {
        Self {
            ok: true,
            ts,
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            ts: None,
            error: Some(error.into()),
        }
    }
}

/// A channel the bot can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
}

/// Typed wrapper over the chat tool server.
#[derive(Clone)]
pub struct ChatClient {
    client: ToolClient,
}

impl ChatClient {
    pub fn new(client: ToolClient) -> Self {
        Self { client }
    }

    pub async fn list_channels(&self) -> Vec<ChannelInfo> {
        match self.client.call_tool_json("list_channels", json!({})).await {
            Ok(value) => value
                .get("channels")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|c| {
                            Some(ChannelInfo {
                                id: c.get("id")?.as_str()?.to_string(),
                                name: c
                                    .get("name")
                                    .and_then(Value::as_str)
                                    .unwrap_or_default()
                                    .to_string(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "list_channels failed, returning empty");
                Vec::new()
            }
        }
    }

    pub async fn post_message(&self, channel: &str, text: &str) -> ChatOutcome {
        self.soft_call(
            "post_message",
            json!({"channel_id": channel, "text": text}),
        )
        .await
    }

    pub async fn reply_to_thread(&self, channel: &str, thread_ts: &str, text: &str) -> ChatOutcome {
        self.soft_call(
            "reply_to_thread",
            json!({"channel_id": channel, "thread_ts": thread_ts, "text": text}),
        )
        .await
    }

    pub async fn add_reaction(&self, channel: &str, ts: &str, emoji: &str) -> ChatOutcome {
        self.soft_call(
            "add_reaction",
            json!({"channel_id": channel, "timestamp": ts, "reaction": emoji}),
        )
        .await
    }

    pub async fn get_channel_history(&self, channel: &str, limit: usize) -> Vec<Value> {
        match self
            .client
            .call_tool_json(
                "get_channel_history",
                json!({"channel_id": channel, "limit": limit}),
            )
            .await
        {
            Ok(value) => value
                .get("messages")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, channel, "get_channel_history failed");
                Vec::new()
            }
        }
    }

    async fn soft_call(&self, tool: &str, arguments: Value) -> ChatOutcome {
        match self.client.call_tool_json(tool, arguments).await {
            Ok(value) => {
                // Servers may themselves answer {ok: false, error}.
                let ok = value.get("ok").and_then(Value::as_bool).unwrap_or(true);
                if ok {
                    let ts = value
                        .get("ts")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    ChatOutcome::success(ts)
                } else {
                    let error = value
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown chat error");
                    tracing::warn!(tool, error, "chat call refused");
                    ChatOutcome::failure(error)
                }
            }
            Err(e) => {
                tracing::warn!(tool, error = %e, "chat call failed softly");
                ChatOutcome::failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
