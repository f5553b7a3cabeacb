// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of started tool clients, one per configured server.

use crate::base::ToolClient;
use crate::chat::ChatClient;
use crate::error::ClientError;
use crate::filesystem::FilesystemClient;
use crate::host::HostClient;
use crate::packer::PackerClient;
use crate::retry::RetryPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use sunset_transport::{ServersConfig, StdioTransport};

/// Conventional server names.
pub const PACKER_SERVER: &str = "ovr_repomix";
pub const HOST_SERVER: &str = "ovr_github";
pub const CHAT_SERVER: &str = "ovr_slack";
pub const FILESYSTEM_SERVER: &str = "ovr_filesystem";

/// Owns one started client per server, created lazily and reused for the
/// whole workflow run. Instances serialize their own protocol, so handing
/// the same client to concurrent steps is safe.
pub struct ClientRegistry {
    config: ServersConfig,
    policy: RetryPolicy,
    clients: tokio::sync::Mutex<HashMap<String, ToolClient>>,
}

impl ClientRegistry {
    pub fn new(config: ServersConfig) -> Self {
        Self {
            config,
            policy: RetryPolicy::default(),
            clients: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register a pre-built client (tests, embedded transports).
    pub async fn insert(&self, server: &str, client: ToolClient) {
        self.clients.lock().await.insert(server.to_string(), client);
    }

    /// Get the started client for a server, spawning its child on first use.
    pub async fn client(&self, server: &str) -> Result<ToolClient, ClientError> {
        let mut clients = self.clients.lock().await;
        if let Some(existing) = clients.get(server) {
            return Ok(existing.clone());
        }

        let launch = self.config.get(server)?;
        let transport =
            StdioTransport::start(server, &launch.command, &launch.args, &launch.env).await?;
        let client =
            ToolClient::new(server, Arc::new(transport)).with_policy(self.policy.clone());
        clients.insert(server.to_string(), client.clone());
        Ok(client)
    }

    pub async fn packer(&self) -> Result<PackerClient, ClientError> {
        Ok(PackerClient::new(self.client(PACKER_SERVER).await?))
    }

    pub async fn host(&self) -> Result<HostClient, ClientError> {
        Ok(HostClient::new(self.client(HOST_SERVER).await?))
    }

    pub async fn chat(&self) -> Result<ChatClient, ClientError> {
        Ok(ChatClient::new(self.client(CHAT_SERVER).await?))
    }

    pub async fn filesystem(&self, root: &str) -> Result<FilesystemClient, ClientError> {
        Ok(FilesystemClient::new(
            self.client(FILESYSTEM_SERVER).await?,
            root,
        ))
    }

    /// Probe every configured server; returns (name, healthy) pairs.
    pub async fn health_snapshot(&self) -> Vec<(String, bool)> {
        let names: Vec<String> = self.config.names().map(str::to_string).collect();
        let mut snapshot = Vec::with_capacity(names.len());
        for name in names {
            let healthy = match self.client(&name).await {
                Ok(client) => client.health_check().await,
                Err(e) => {
                    tracing::warn!(server = %name, error = %e, "health probe failed to start client");
                    false
                }
            };
            snapshot.push((name, healthy));
        }
        snapshot
    }

    /// Shut every started client down.
    pub async fn shutdown_all(&self, grace: Duration) {
        let clients: Vec<ToolClient> = self.clients.lock().await.values().cloned().collect();
        for client in clients {
            client.shutdown(grace).await;
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
