// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use sunset_transport::FakeTransport;

fn empty_config() -> ServersConfig {
    ServersConfig::parse(r#"{"mcpServers": {}}"#, "test.json".into(), |_| None).unwrap()
}

#[tokio::test]
async fn unknown_server_is_config_error() {
    let registry = ClientRegistry::new(empty_config());
    let err = registry.client("ovr_github").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Config(sunset_core::ConfigError::UnknownServer(_))
    ));
}

#[tokio::test]
async fn inserted_clients_are_reused() {
    let registry = ClientRegistry::new(empty_config());
    let fake = Arc::new(FakeTransport::new());
    fake.set_default_reply(serde_json::json!({"ok": true}));
    registry
        .insert(CHAT_SERVER, ToolClient::new(CHAT_SERVER, Arc::clone(&fake) as Arc<dyn sunset_transport::Transport>))
        .await;

    let chat = registry.chat().await.unwrap();
    chat.post_message("C1", "hello").await;

    let again = registry.chat().await.unwrap();
    again.post_message("C1", "world").await;

    // Both wrappers share the single inserted transport.
    assert_eq!(fake.tool_calls("post_message").len(), 2);
}

#[tokio::test]
async fn health_snapshot_covers_configured_servers() {
    let config = ServersConfig::parse(
        r#"{"mcpServers": {"ovr_slack": {"command": "true"}}}"#,
        "test.json".into(),
        |_| None,
    )
    .unwrap();
    let registry = ClientRegistry::new(config);

    let fake = Arc::new(FakeTransport::new());
    fake.push_method_ok("tools/list", serde_json::json!({"tools": []}));
    registry
        .insert("ovr_slack", ToolClient::new("ovr_slack", fake))
        .await;

    let snapshot = registry.health_snapshot().await;
    assert_eq!(snapshot, vec![("ovr_slack".to_string(), true)]);
}

#[tokio::test]
async fn shutdown_all_reaches_every_client() {
    let registry = ClientRegistry::new(empty_config());
    let fake = Arc::new(FakeTransport::new());
    registry
        .insert(HOST_SERVER, ToolClient::new(HOST_SERVER, Arc::clone(&fake) as Arc<dyn sunset_transport::Transport>))
        .await;

    registry.shutdown_all(Duration::from_millis(10)).await;
    assert_eq!(fake.shutdown_count(), 1);
}
