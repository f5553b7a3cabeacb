// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process transport over line-delimited stdio.

use crate::protocol::{decode_response, encode_request, JsonRpcRequest};
use crate::transport::{ProtocolError, Transport};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Upper bound on any single stderr read.
///
/// Some tool servers write to stderr intermittently; an unbounded read once
/// produced 45-second stalls. Reads past this bound are abandoned and the
/// drain loop re-polls.
pub const STDERR_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// How many trailing stderr lines are retained for diagnostics.
const STDERR_TAIL_LINES: usize = 100;

#[derive(Debug)]
struct Session {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

/// One child process speaking JSON-RPC over stdin/stdout.
///
/// Calls are serialized: the session lock admits one request at a time, so
/// responses can never interleave. Use one instance per unit of parallelism.
#[derive(Debug)]
pub struct StdioTransport {
    name: String,
    session: tokio::sync::Mutex<Option<Session>>,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
}

impl StdioTransport {
    /// Spawn the child and start the stderr drain task.
    pub async fn start(
        name: impl Into<String>,
        command: &str,
        args: &[String],
        env: &BTreeMap<String, String>,
    ) -> Result<Self, ProtocolError> {
        let name = name.into();
        let mut child = Command::new(command)
            .args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProtocolError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(ProtocolError::NotStarted)?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or(ProtocolError::NotStarted)?;
        let stderr = child.stderr.take();

        let stderr_tail = Arc::new(Mutex::new(VecDeque::new()));
        if let Some(stderr) = stderr {
            let tail = Arc::clone(&stderr_tail);
            let server = name.clone();
            tokio::spawn(async move {
                drain_stderr(stderr, tail, server).await;
            });
        }

        tracing::debug!(server = %name, command, "tool server started");

        Ok(Self {
            name,
            session: tokio::sync::Mutex::new(Some(Session {
                child,
                stdin,
                stdout,
                next_id: 1,
            })),
            stderr_tail,
        })
    }

    /// Trailing stderr lines captured from the child, oldest first.
    pub fn stderr_tail(&self) -> Vec<String> {
        self.stderr_tail.lock().iter().cloned().collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn call_inner(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ProtocolError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(ProtocolError::NotStarted)?;

        let id = session.next_id;
        session.next_id += 1;

        let line = encode_request(&JsonRpcRequest::new(id, method, params))?;

        let result = tokio::time::timeout(timeout, async {
            session.stdin.write_all(line.as_bytes()).await?;
            session.stdin.write_all(b"\n").await?;
            session.stdin.flush().await?;

            let mut buf = String::new();
            loop {
                buf.clear();
                let n = session.stdout.read_line(&mut buf).await?;
                if n == 0 {
                    let status = session.child.try_wait().ok().flatten();
                    return Err(ProtocolError::ProcessExited {
                        status: status.and_then(|s| s.code()),
                    });
                }
                let trimmed = buf.trim();
                if trimmed.is_empty() || is_notification(trimmed) {
                    continue;
                }
                return decode_response(trimmed, id);
            }
        })
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => {
                tracing::warn!(server = %self.name, method, ?timeout, "transport call timed out");
                Err(ProtocolError::Timeout(timeout))
            }
        }
    }

    /// Close stdin, wait up to `grace`, then kill.
    pub async fn stop(&self, grace: Duration) {
        let mut guard = self.session.lock().await;
        if let Some(mut session) = guard.take() {
            drop(session.stdin);
            match tokio::time::timeout(grace, session.child.wait()).await {
                Ok(Ok(status)) => {
                    tracing::debug!(server = %self.name, ?status, "tool server exited");
                }
                Ok(Err(e)) => {
                    tracing::warn!(server = %self.name, error = %e, "wait on tool server failed");
                }
                Err(_) => {
                    tracing::warn!(server = %self.name, "tool server did not exit, killing");
                    let _ = session.child.start_kill();
                    let _ = session.child.wait().await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for StdioTransport {
    async fn call(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, ProtocolError> {
        self.call_inner(method, params, timeout).await
    }

    async fn shutdown(&self, grace: Duration) {
        self.stop(grace).await;
    }
}

/// Server-initiated lines carry a `method` and no `id`; they are not replies.
fn is_notification(line: &str) -> bool {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => value.get("method").is_some() && value.get("id").is_none(),
        Err(_) => false,
    }
}

/// Drain stderr into a bounded ring buffer.
///
/// Every read is bounded by [`STDERR_READ_TIMEOUT`]; an expired read is
/// discarded and the loop re-polls, so a silent child never blocks shutdown.
async fn drain_stderr(
    stderr: tokio::process::ChildStderr,
    tail: Arc<Mutex<VecDeque<String>>>,
    server: String,
) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match tokio::time::timeout(STDERR_READ_TIMEOUT, lines.next_line()).await {
            Ok(Ok(Some(line))) => {
                tracing::debug!(server = %server, stderr = %line, "tool server stderr");
                let mut tail = tail.lock();
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                tracing::debug!(server = %server, error = %e, "stderr read failed");
                break;
            }
            Err(_) => continue,
        }
    }
}

#[cfg(test)]
#[path = "stdio_tests.rs"]
mod tests;
