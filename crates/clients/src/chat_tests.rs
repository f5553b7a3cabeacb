// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::retry::RetryPolicy;
use std::sync::Arc;
use sunset_transport::{FakeTransport, ProtocolError};

fn chat(fake: &Arc<FakeTransport>) -> ChatClient {
    ChatClient::new(ToolClient::new("ovr_slack", Arc::clone(fake) as Arc<dyn sunset_transport::Transport>).with_policy(RetryPolicy::none()))
}

#[tokio::test]
async fn post_message_returns_ts() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "post_message",
        serde_json::json!({"ok": true, "ts": "1722470400.000100"}),
    );

    let outcome = chat(&fake).post_message("C123", "done").await;
    assert!(outcome.ok);
    assert_eq!(outcome.ts.as_deref(), Some("1722470400.000100"));
}

#[tokio::test]
async fn transport_failure_is_soft() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_err(
        "post_message",
        ProtocolError::ProcessExited { status: Some(1) },
    );

    let outcome = chat(&fake).post_message("C123", "hello").await;
    assert!(!outcome.ok);
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn server_refusal_is_soft() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "post_message",
        serde_json::json!({"ok": false, "error": "channel_not_found"}),
    );

    let outcome = chat(&fake).post_message("C404", "hello").await;
    assert!(!outcome.ok);
    assert_eq!(outcome.error.as_deref(), Some("channel_not_found"));
}

#[tokio::test]
async fn list_channels_parses() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "list_channels",
        serde_json::json!({"channels": [{"id": "C1", "name": "ops"}, {"id": "C2", "name": "db"}]}),
    );

    let channels = chat(&fake).list_channels().await;
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].name, "ops");
}

#[tokio::test]
async fn list_channels_empty_on_error() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_err(
        "list_channels",
        ProtocolError::Rpc {
            code: -32000,
            message: "auth".into(),
        },
    );
    assert!(chat(&fake).list_channels().await.is_empty());
}

#[tokio::test]
async fn reply_and_reaction_forward_arguments() {
    let fake = Arc::new(FakeTransport::new());
    fake.set_default_reply(serde_json::json!({"ok": true}));

    let client = chat(&fake);
    client.reply_to_thread("C1", "123.456", "detail").await;
    client.add_reaction("C1", "123.456", "white_check_mark").await;

    let replies = fake.tool_calls("reply_to_thread");
    assert_eq!(replies[0]["thread_ts"], "123.456");
    let reactions = fake.tool_calls("add_reaction");
    assert_eq!(reactions[0]["reaction"], "white_check_mark");
}
