// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::retry::RetryPolicy;
use std::sync::Arc;
use sunset_transport::FakeTransport;

fn fs(fake: &Arc<FakeTransport>) -> FilesystemClient {
    FilesystemClient::new(
        ToolClient::new("ovr_filesystem", Arc::clone(fake) as Arc<dyn sunset_transport::Transport>).with_policy(RetryPolicy::none()),
        ".",
    )
}

#[tokio::test]
async fn read_file_unwraps_text() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "read_file",
        serde_json::json!({"content": [{"type": "text", "text": "body"}]}),
    );

    let text = fs(&fake).read_file("notes/a.txt").await.unwrap();
    assert_eq!(text, "body");
}

#[yare::parameterized(
    absolute = { "/etc/passwd" },
    escape   = { "../outside" },
    sneaky   = { "a/../../outside" },
)]
fn escaping_paths_are_rejected(path: &str) {
    let fake = Arc::new(FakeTransport::new());
    let err = fs(&fake).confine(path).unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn interior_parent_components_are_allowed() {
    let fake = Arc::new(FakeTransport::new());
    fake.set_default_reply(serde_json::json!({}));
    // a/../b stays inside the root
    fs(&fake).read_file("a/../b.txt").await.unwrap();
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn list_directory_accepts_entries_or_array() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "list_directory",
        serde_json::json!({"entries": ["a.txt", "b.txt"]}),
    );
    fake.push_tool_ok("list_directory", serde_json::json!(["c.txt"]));

    let client = fs(&fake);
    assert_eq!(client.list_directory("d").await.unwrap().len(), 2);
    assert_eq!(client.list_directory("d").await.unwrap(), vec!["c.txt"]);
}

#[tokio::test]
async fn move_file_confines_both_ends() {
    let fake = Arc::new(FakeTransport::new());
    let err = fs(&fake).move_file("ok.txt", "../nope.txt").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn write_file_forwards_content() {
    let fake = Arc::new(FakeTransport::new());
    fake.set_default_reply(serde_json::json!({}));

    fs(&fake).write_file("out/result.json", "{}").await.unwrap();
    let calls = fake.tool_calls("write_file");
    assert_eq!(calls[0]["content"], "{}");
}
