// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared spec harness: a pipeline wired to a scripted fake transport.

use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use sunset_clients::{
    ClientRegistry, RetryPolicy, ToolClient, CHAT_SERVER, HOST_SERVER, PACKER_SERVER,
};
use sunset_core::{ParameterConfig, ParameterService};
use sunset_logging::{read_entries, RotatingFileSink, StructuredLogger};
use sunset_pipeline::{DecommissionWorkflow, PipelineOutcome, PipelineSettings};
use sunset_transport::{FakeTransport, ServersConfig};
use sunset_workflow::{CancellationToken, WorkflowContext};

pub const REPO_URL: &str = "https://github.com/acme/payments";

/// One spec run: fake transport, context, audit log, settings.
pub struct Spec {
    pub fake: Arc<FakeTransport>,
    pub context: Arc<WorkflowContext>,
    pub environment: ParameterConfig,
    pub settings: PipelineSettings,
    pub log_path: std::path::PathBuf,
    pub dir: tempfile::TempDir,
}

impl Spec {
    /// Wire a spec around one packed archive served for `database`.
    pub async fn new(database: &str, archive: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("pack.xml");
        std::fs::write(&archive_path, archive).unwrap();
        let log_path = dir.path().join("dbworkflow.log");

        let fake = Arc::new(FakeTransport::new());
        fake.set_default_reply(json!({}));
        fake.push_tool_ok(
            "pack_remote_repository",
            json!({
                "archive_path": archive_path.display().to_string(),
                "file_count": 4,
                "total_size": 4096,
            }),
        );
        fake.push_tool_ok(
            "create_pull_request",
            json!({"html_url": format!("{REPO_URL}/pull/7")}),
        );

        let registry = Arc::new(ClientRegistry::new(
            ServersConfig::parse(r#"{"mcpServers": {}}"#, "spec.json".into(), |_| None).unwrap(),
        ));
        for server in [PACKER_SERVER, HOST_SERVER, CHAT_SERVER] {
            registry
                .insert(
                    server,
                    ToolClient::new(server, Arc::clone(&fake) as Arc<dyn sunset_transport::Transport>).with_policy(
                        RetryPolicy::default()
                            .base_delay(std::time::Duration::from_millis(1))
                            .jitter(0.0),
                    ),
                )
                .await;
        }

        let logger = StructuredLogger::new(format!("spec-{database}"))
            .with_file_sink(RotatingFileSink::new(&log_path));
        let context = Arc::new(WorkflowContext::new(logger));
        context.set_clients(registry);

        let service = ParameterService::from_map(
            [(
                "GITHUB_TOKEN".to_string(),
                "ghp_spec_abcdefghijklmnop".to_string(),
            )]
            .into_iter()
            .collect::<BTreeMap<_, _>>(),
        )
        .mark_secret(&["GITHUB_TOKEN"]);
        let environment = DecommissionWorkflow::resolve_environment(&service).unwrap();

        let settings = PipelineSettings::new(database, vec![REPO_URL.to_string()])
            .date(chrono::NaiveDate::from_ymd_opt(2026, 8, 1).unwrap())
            .quarantine_root(dir.path().join("quarantine"));

        Self {
            fake,
            context,
            environment,
            settings,
            log_path,
            dir,
        }
    }

    /// Run the pipeline to completion.
    pub async fn run(&self) -> PipelineOutcome {
        DecommissionWorkflow::new(self.settings.clone())
            .run(
                &self.environment,
                Arc::clone(&self.context),
                CancellationToken::new(),
            )
            .await
            .unwrap()
    }

    /// All committed file contents, keyed by path.
    pub fn committed_files(&self) -> BTreeMap<String, String> {
        self.fake
            .tool_calls("create_or_update_file")
            .into_iter()
            .filter_map(|call| {
                Some((
                    call.get("path")?.as_str()?.to_string(),
                    call.get("content")?.as_str()?.to_string(),
                ))
            })
            .collect()
    }

    /// Entries from the JSON audit log.
    pub fn log_entries(&self) -> Vec<sunset_logging::LogEntry> {
        read_entries(&self.log_path).unwrap_or_default()
    }
}
