// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::retry::RetryPolicy;
use std::sync::Arc;
use sunset_transport::FakeTransport;

fn packer(fake: &Arc<FakeTransport>) -> PackerClient {
    PackerClient::new(
        ToolClient::new("ovr_repomix", Arc::clone(fake) as Arc<dyn sunset_transport::Transport>).with_policy(RetryPolicy::none()),
    )
}

#[tokio::test]
async fn pack_remote_repository_parses_outcome() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "pack_remote_repository",
        serde_json::json!({"archive_path": "/tmp/pack.xml", "file_count": 42, "total_size": 9001}),
    );

    let outcome = packer(&fake)
        .pack_remote_repository("https://github.com/acme/payments", None, None)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        PackOutcome {
            archive_path: "/tmp/pack.xml".into(),
            file_count: 42,
            total_size: 9001,
        }
    );
}

#[tokio::test]
async fn pack_accepts_camel_case_fields() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "pack_codebase",
        serde_json::json!({"outputPath": "/tmp/out.xml", "totalFiles": 3, "totalSize": 77}),
    );

    let outcome = packer(&fake).pack_codebase("/src", true, 10).await.unwrap();
    assert_eq!(outcome.archive_path, "/tmp/out.xml");
    assert_eq!(outcome.file_count, 3);
}

#[tokio::test]
async fn empty_url_is_rejected_client_side() {
    let fake = Arc::new(FakeTransport::new());
    let err = packer(&fake)
        .pack_remote_repository("", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn globs_are_forwarded() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "pack_remote_repository",
        serde_json::json!({"archive_path": "/tmp/p.xml"}),
    );

    packer(&fake)
        .pack_remote_repository(
            "https://github.com/acme/payments",
            Some(&["**/*.py".to_string()]),
            Some(&["vendor/**".to_string()]),
        )
        .await
        .unwrap();

    let calls = fake.tool_calls("pack_remote_repository");
    assert_eq!(calls[0]["include"], "**/*.py");
    assert_eq!(calls[0]["ignore"], "vendor/**");
}

#[tokio::test]
async fn grep_accepts_list_and_text_shapes() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok(
        "grep_packed_output",
        serde_json::json!(["a.py:3: postgres_air", "b.tf:9: postgres_air"]),
    );
    fake.push_tool_ok(
        "grep_packed_output",
        serde_json::json!({"content": [{"type": "text", "text": "one\ntwo"}]}),
    );

    let client = packer(&fake);
    let first = client
        .grep_packed_output("/tmp/p.xml", "postgres_air", 2)
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let second = client
        .grep_packed_output("/tmp/p.xml", "postgres_air", 2)
        .await
        .unwrap();
    assert_eq!(second, vec!["one", "two"]);
}

#[tokio::test]
async fn missing_archive_path_is_invalid_response() {
    let fake = Arc::new(FakeTransport::new());
    fake.push_tool_ok("pack_remote_repository", serde_json::json!({"nope": 1}));

    let err = packer(&fake)
        .pack_remote_repository("https://github.com/acme/payments", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}
