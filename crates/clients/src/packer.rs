// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository packer client.

use crate::base::ToolClient;
use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Result of packing a repository into a single archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackOutcome {
    pub archive_path: String,
    pub file_count: usize,
    pub total_size: u64,
}

/// Typed wrapper over the repository packer tool server.
#[derive(Clone)]
pub struct PackerClient {
    client: ToolClient,
}

impl PackerClient {
    pub fn new(client: ToolClient) -> Self {
        Self { client }
    }

    /// Pack a remote repository into a local archive.
    pub async fn pack_remote_repository(
        &self,
        url: &str,
        include_globs: Option<&[String]>,
        exclude_globs: Option<&[String]>,
    ) -> Result<PackOutcome, ClientError> {
        if url.is_empty() {
            return Err(ClientError::InvalidArgument("repository url is empty".into()));
        }
        let mut arguments = json!({"url": url});
        if let Some(include) = include_globs {
            arguments["include"] = json!(include.join(","));
        }
        if let Some(exclude) = exclude_globs {
            arguments["ignore"] = json!(exclude.join(","));
        }
        let value = self
            .client
            .call_tool_json("pack_remote_repository", arguments)
            .await?;
        parse_pack_outcome(&value)
    }

    /// Pack a local checkout.
    pub async fn pack_codebase(
        &self,
        local_path: &str,
        compress: bool,
        top_files_length: usize,
    ) -> Result<PackOutcome, ClientError> {
        let value = self
            .client
            .call_tool_json(
                "pack_codebase",
                json!({
                    "directory": local_path,
                    "compress": compress,
                    "topFilesLength": top_files_length,
                }),
            )
            .await?;
        parse_pack_outcome(&value)
    }

    /// Grep a packed archive; returns matching lines.
    pub async fn grep_packed_output(
        &self,
        archive_path: &str,
        pattern: &str,
        context_lines: usize,
    ) -> Result<Vec<String>, ClientError> {
        let value = self
            .client
            .call_tool_json(
                "grep_packed_output",
                json!({
                    "path": archive_path,
                    "pattern": pattern,
                    "contextLines": context_lines,
                }),
            )
            .await?;

        match value {
            Value::Array(items) => Ok(items
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()),
            Value::Object(ref map) if map.contains_key("matches") => {
                let items = map
                    .get("matches")
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        ClientError::invalid_response("grep_packed_output", "matches is not a list")
                    })?;
                Ok(items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect())
            }
            Value::String(text) => Ok(text.lines().map(str::to_string).collect()),
            other => Err(ClientError::invalid_response(
                "grep_packed_output",
                format!("unexpected shape: {other}"),
            )),
        }
    }
}

fn parse_pack_outcome(value: &Value) -> Result<PackOutcome, ClientError> {
    let archive_path = value
        .get("archive_path")
        .or_else(|| value.get("outputPath"))
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::invalid_response("pack", "missing archive path"))?
        .to_string();
    Ok(PackOutcome {
        archive_path,
        file_count: value
            .get("file_count")
            .or_else(|| value.get("totalFiles"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize,
        total_size: value
            .get("total_size")
            .or_else(|| value.get("totalSize"))
            .and_then(Value::as_u64)
            .unwrap_or(0),
    })
}

#[cfg(test)]
#[path = "packer_tests.rs"]
mod tests;
