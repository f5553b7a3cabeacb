// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sunset_transport::{FakeTransport, ProtocolError};

fn fast_policy() -> RetryPolicy {
    RetryPolicy::default()
        .base_delay(Duration::from_millis(1))
        .jitter(0.0)
}

fn client(fake: Arc<FakeTransport>) -> ToolClient {
    ToolClient::new("ovr_test", fake).with_policy(fast_policy())
}

#[tokio::test]
async fn list_tools_parses_and_caches() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_method_ok(
        "tools/list",
        serde_json::json!({"tools": [{"name": "pack_remote_repository"}, {"name": "grep_packed_output"}]}),
    );

    let client = client(Arc::clone(&fake));
    let tools = client.list_available_tools().await.unwrap();
    assert_eq!(tools, vec!["pack_remote_repository", "grep_packed_output"]);

    // Second listing hits the cache; the queue is empty but no call is made.
    let again = client.list_available_tools().await.unwrap();
    assert_eq!(again, tools);
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn health_check_false_on_error() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_method_err(
        "tools/list",
        ProtocolError::Rpc {
            code: -32601,
            message: "nope".into(),
        },
    );
    assert!(!client(fake).health_check().await);
}

#[tokio::test]
async fn call_tool_unwraps_text_envelope() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "read_file",
        serde_json::json!({"content": [{"type": "text", "text": "hello"}]}),
    );

    let response = client(fake)
        .call_tool("read_file", serde_json::json!({"path": "a.txt"}))
        .await
        .unwrap();
    assert_eq!(response.into_text(), "hello");
}

#[tokio::test]
async fn transient_errors_retry_then_succeed() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_err("flaky", ProtocolError::Timeout(Duration::from_secs(1)));
    fake.push_tool_err("flaky", ProtocolError::Timeout(Duration::from_secs(1)));
    fake.push_tool_ok("flaky", serde_json::json!({"ok": true}));

    let response = client(Arc::clone(&fake))
        .call_tool("flaky", serde_json::json!({}))
        .await
        .unwrap();
    assert_eq!(response.into_value(), serde_json::json!({"ok": true}));
    assert_eq!(fake.tool_calls("flaky").len(), 3);
}

#[tokio::test]
async fn deterministic_errors_do_not_retry() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_err(
        "strict",
        ProtocolError::Rpc {
            code: -32602,
            message: "bad arguments".into(),
        },
    );

    let err = client(Arc::clone(&fake))
        .call_tool("strict", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Protocol(ProtocolError::Rpc { .. })));
    assert_eq!(fake.tool_calls("strict").len(), 1);
}

#[tokio::test]
async fn exhausted_retries_report_attempts() {
    let fake = Arc::new(FakeTransport::new());
    for _ in 0..4 {
        fake.push_tool_err("down", ProtocolError::Timeout(Duration::from_secs(1)));
    }

    let err = client(Arc::clone(&fake))
        .call_tool("down", serde_json::json!({}))
        .await
        .unwrap_err();
    match err {
        ClientError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 4),
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(fake.tool_calls("down").len(), 4);
}

#[tokio::test]
async fn rate_limit_is_retryable() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_err(
        "limited",
        ProtocolError::Rpc {
            code: -32005,
            message: "rate limited".into(),
        },
    );
    fake.push_tool_ok("limited", serde_json::json!({"done": true}));

    let response = client(fake)
        .call_tool("limited", serde_json::json!({}))
        .await
        .unwrap();
    assert_eq!(response.into_value(), serde_json::json!({"done": true}));
}
