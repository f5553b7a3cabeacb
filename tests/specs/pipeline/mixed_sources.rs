// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Four source types in one repository, each rewritten in its own idiom.

use crate::prelude::*;
use sunset_workflow::WorkflowStatus;

const MIXED_ARCHIVE: &str = r#"<repository url="https://github.com/acme/payments">
<file path="infra/main.tf"><![CDATA[resource "postgresql_database" "postgres_air" {
  name  = "postgres_air"
  owner = "dba"
}
]]></file>
<file path="chart/values.yaml"><![CDATA[database: postgres_air
replicas: 2
]]></file>
<file path="app/dao.py"><![CDATA[DATABASE_URL = "postgresql://svc@db.internal:5432/postgres_air"
]]></file>
<file path="README.md"><![CDATA[# payments

This service reads from postgres_air.
]]></file>
</repository>
"#;

#[tokio::test]
async fn four_files_four_commits_with_correct_tokens() {
    let spec = Spec::new("postgres_air", MIXED_ARCHIVE).await;
    let outcome = spec.run().await;

    assert_eq!(outcome.result.status, WorkflowStatus::Completed);
    let repo = &outcome.repositories[0];
    assert_eq!(repo.files_matched, 4);
    assert_eq!(repo.files_modified, 4);

    let committed = spec.committed_files();
    assert_eq!(committed.len(), 4);

    // Terraform: block commented with '#'.
    let tf = &committed["infra/main.tf"];
    assert!(tf.contains("# resource \"postgresql_database\" \"postgres_air\" {"));
    assert!(tf.contains("# }"));

    // Helm values: '#' comment on the matching line, neighbours untouched.
    let values = &committed["chart/values.yaml"];
    assert!(values.contains("# database: postgres_air"));
    assert!(values.contains("\nreplicas: 2"));

    // Python: raising guard plus commented original.
    let dao = &committed["app/dao.py"];
    assert!(dao.contains("raise RuntimeError"));
    assert!(dao.contains("# DATABASE_URL = \"postgresql://svc@db.internal:5432/postgres_air\""));

    // Documentation: HTML comment notice above the mention.
    let readme = &committed["README.md"];
    assert!(readme.contains("<!-- DEPRECATED: postgres_air was decommissioned on 2026-08-01"));
    assert!(readme.contains("This service reads from postgres_air."));

    // Every file carries its header exactly once.
    for (path, content) in &committed {
        assert_eq!(
            content.matches("DECOMMISSIONED").count(),
            1,
            "header count in {path}"
        );
        assert!(
            content.lines().next().unwrap().contains("DECOMMISSIONED"),
            "header must lead {path}"
        );
    }

    // Commit messages name the source type and the database.
    let messages: Vec<String> = spec
        .fake
        .tool_calls("create_or_update_file")
        .into_iter()
        .filter_map(|c| c.get("message").map(|m| m.as_str().unwrap_or("").to_string()))
        .collect();
    assert!(messages.iter().any(|m| m.starts_with("decommission(infrastructure):")));
    assert!(messages.iter().any(|m| m.starts_with("decommission(python):")));
    assert!(messages.iter().any(|m| m.starts_with("decommission(documentation):")));
    assert!(messages
        .iter()
        .all(|m| m.contains("remove postgres_air references from")));
}

#[tokio::test]
async fn quarantine_copies_preserve_structure() {
    let spec = Spec::new("postgres_air", MIXED_ARCHIVE).await;
    spec.run().await;

    let root = spec.dir.path().join("quarantine/postgres_air");
    assert!(root.join("infra/main.tf").exists());
    assert!(root.join("chart/values.yaml").exists());
    assert!(root.join("app/dao.py").exists());
    assert!(root.join("README.md").exists());

    // Quarantine holds the original, unmodified content.
    let original = std::fs::read_to_string(root.join("app/dao.py")).unwrap();
    assert!(!original.contains("DECOMMISSIONED"));
}
