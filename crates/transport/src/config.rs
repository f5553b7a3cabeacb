// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool-server launch configuration.
//!
//! JSON document with root key `mcpServers`; each entry names a child
//! process to spawn. `${VAR}` inside strings is substituted from the
//! process environment at load time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use sunset_core::ConfigError;

/// Required prefix for every configured server name.
pub const SERVER_NAME_PREFIX: &str = "ovr_";

/// How to launch one tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLaunch {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    #[serde(rename = "mcpServers")]
    mcp_servers: BTreeMap<String, ServerLaunch>,
}

/// Parsed and validated server catalog.
#[derive(Debug, Clone, Default)]
pub struct ServersConfig {
    servers: BTreeMap<String, ServerLaunch>,
}

impl ServersConfig {
    /// Load from a JSON file, substituting `${VAR}` from the process env.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, path.display().to_string(), |name| {
            std::env::var(name).ok()
        })
    }

    /// Parse from a string with an explicit variable lookup (testable).
    pub fn parse(
        content: &str,
        path: String,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::MalformedServerConfig {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let mut servers = BTreeMap::new();
        for (name, mut launch) in raw.mcp_servers {
            if !name.starts_with(SERVER_NAME_PREFIX) {
                return Err(ConfigError::BadServerName(name));
            }
            launch.command = substitute(&launch.command, &lookup);
            launch.args = launch.args.iter().map(|a| substitute(a, &lookup)).collect();
            launch.env = launch
                .env
                .iter()
                .map(|(k, v)| (k.clone(), substitute(v, &lookup)))
                .collect();
            servers.insert(name, launch);
        }
        Ok(Self { servers })
    }

    pub fn get(&self, name: &str) -> Result<&ServerLaunch, ConfigError> {
        self.servers
            .get(name)
            .ok_or_else(|| ConfigError::UnknownServer(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

/// Replace every `${VAR}` occurrence; unknown variables substitute to empty.
fn substitute(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(end) => {
                let name = &rest[start + 2..start + 2 + end];
                if let Some(value) = lookup(name) {
                    out.push_str(&value);
                }
                rest = &rest[start + 2 + end + 1..];
            }
            None => {
                // Unterminated marker, keep literally
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
