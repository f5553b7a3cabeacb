// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source-host client (repositories, branches, commits, pull requests).

use crate::base::ToolClient;
use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Owner/repo pair parsed from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Parse `https://host/<owner>/<repo>[.git]` into a reference.
    pub fn parse_url(url: &str) -> Result<Self, ClientError> {
        let trimmed = url.trim_end_matches('/').trim_end_matches(".git");
        let mut segments = trimmed.rsplit('/');
        let repo = segments.next().unwrap_or_default();
        let owner = segments.next().unwrap_or_default();
        if owner.is_empty() || repo.is_empty() || owner.contains(':') {
            return Err(ClientError::InvalidArgument(format!(
                "cannot parse owner/repo from {url:?}"
            )));
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Shallow structural survey of a repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoStructure {
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub file_tree: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A created or updated commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    pub path: String,
}

/// Typed wrapper over the source-host tool server.
#[derive(Clone)]
pub struct HostClient {
    client: ToolClient,
}

impl HostClient {
    pub fn new(client: ToolClient) -> Self {
        Self { client }
    }

    /// Search repositories by query.
    ///
    /// The tool catalog has no dedicated get-repository call; lookups route
    /// through search.
    pub async fn search_repositories(&self, query: &str) -> Result<Vec<Value>, ClientError> {
        let value = self
            .client
            .call_tool_json("search_repositories", json!({"query": query}))
            .await?;
        let items = value
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .or_else(|| value.as_array().cloned())
            .ok_or_else(|| {
                ClientError::invalid_response("search_repositories", "missing items array")
            })?;
        Ok(items)
    }

    /// Survey languages, tree and dependencies. Advisory: callers treat
    /// failures as warnings, never preconditions.
    pub async fn analyze_repo_structure(
        &self,
        repo: &RepoRef,
    ) -> Result<RepoStructure, ClientError> {
        let value = self
            .client
            .call_tool_json(
                "analyze_repo_structure",
                json!({"owner": repo.owner, "repo": repo.repo}),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| {
            ClientError::invalid_response("analyze_repo_structure", e.to_string())
        })
    }

    pub async fn get_file_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<String, ClientError> {
        let mut arguments = json!({"owner": repo.owner, "repo": repo.repo, "path": path});
        if let Some(git_ref) = git_ref {
            arguments["ref"] = json!(git_ref);
        }
        self.client.call_tool_text("get_file_contents", arguments).await
    }

    pub async fn create_branch(
        &self,
        repo: &RepoRef,
        from_ref: &str,
        new_branch: &str,
    ) -> Result<(), ClientError> {
        if new_branch.is_empty() {
            return Err(ClientError::InvalidArgument("branch name is empty".into()));
        }
        self.client
            .call_tool_json(
                "create_branch",
                json!({
                    "owner": repo.owner,
                    "repo": repo.repo,
                    "from_branch": from_ref,
                    "branch": new_branch,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn create_or_update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        content: &str,
        message: &str,
        branch: &str,
    ) -> Result<CommitRef, ClientError> {
        let value = self
            .client
            .call_tool_json(
                "create_or_update_file",
                json!({
                    "owner": repo.owner,
                    "repo": repo.repo,
                    "path": path,
                    "content": content,
                    "message": message,
                    "branch": branch,
                }),
            )
            .await?;
        let sha = value
            .get("commit")
            .and_then(|c| c.get("sha"))
            .or_else(|| value.get("sha"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(CommitRef {
            sha,
            path: path.to_string(),
        })
    }

    pub async fn create_pull_request(
        &self,
        repo: &RepoRef,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<String, ClientError> {
        let value = self
            .client
            .call_tool_json(
                "create_pull_request",
                json!({
                    "owner": repo.owner,
                    "repo": repo.repo,
                    "title": title,
                    "head": head,
                    "base": base,
                    "body": body,
                }),
            )
            .await?;
        value
            .get("html_url")
            .or_else(|| value.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::invalid_response("create_pull_request", "missing url"))
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
