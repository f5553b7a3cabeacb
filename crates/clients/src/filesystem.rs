// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem client, confined to a single allowed root.

use crate::base::ToolClient;
use crate::error::ClientError;
use serde_json::{json, Value};
use std::path::{Component, Path, PathBuf};

/// Typed wrapper over the filesystem tool server.
///
/// The server itself is configured with one allowed root; this client also
/// rejects escaping paths before they reach the wire.
#[derive(Clone)]
pub struct FilesystemClient {
    client: ToolClient,
    root: PathBuf,
}

impl FilesystemClient {
    pub fn new(client: ToolClient, root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            root: root.into(),
        }
    }

    pub async fn read_file(&self, path: &str) -> Result<String, ClientError> {
        let path = self.confine(path)?;
        self.client
            .call_tool_text("read_file", json!({"path": path}))
            .await
    }

    pub async fn write_file(&self, path: &str, content: &str) -> Result<(), ClientError> {
        let path = self.confine(path)?;
        self.client
            .call_tool_json("write_file", json!({"path": path, "content": content}))
            .await?;
        Ok(())
    }

    pub async fn list_directory(&self, path: &str) -> Result<Vec<String>, ClientError> {
        let path = self.confine(path)?;
        let value = self
            .client
            .call_tool_json("list_directory", json!({"path": path}))
            .await?;
        Ok(string_list(&value, "entries"))
    }

    pub async fn create_directory(&self, path: &str) -> Result<(), ClientError> {
        let path = self.confine(path)?;
        self.client
            .call_tool_json("create_directory", json!({"path": path}))
            .await?;
        Ok(())
    }

    pub async fn search_files(&self, path: &str, pattern: &str) -> Result<Vec<String>, ClientError> {
        let path = self.confine(path)?;
        let value = self
            .client
            .call_tool_json("search_files", json!({"path": path, "pattern": pattern}))
            .await?;
        Ok(string_list(&value, "matches"))
    }

    pub async fn move_file(&self, source: &str, destination: &str) -> Result<(), ClientError> {
        let source = self.confine(source)?;
        let destination = self.confine(destination)?;
        self.client
            .call_tool_json(
                "move_file",
                json!({"source": source, "destination": destination}),
            )
            .await?;
        Ok(())
    }

    /// Normalize a path under the allowed root; reject escapes.
    fn confine(&self, path: &str) -> Result<String, ClientError> {
        let relative = Path::new(path);
        if relative.is_absolute() {
            return Err(ClientError::InvalidArgument(format!(
                "absolute path {path:?} outside allowed root"
            )));
        }
        let mut depth: i32 = 0;
        for component in relative.components() {
            match component {
                Component::ParentDir => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ClientError::InvalidArgument(format!(
                            "path {path:?} escapes allowed root"
                        )));
                    }
                }
                Component::Normal(_) => depth += 1,
                _ => {}
            }
        }
        Ok(self.root.join(relative).display().to_string())
    }
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_else(|| match value {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Value::String(text) => text.lines().map(str::to_string).collect(),
            _ => Vec::new(),
        })
}

#[cfg(test)]
#[path = "filesystem_tests.rs"]
mod tests;
