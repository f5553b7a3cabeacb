// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-memory transport for tests.

use crate::transport::{ProtocolError, Transport};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;

/// One scripted reply.
pub enum FakeReply {
    Ok(Value),
    Err(ProtocolError),
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

/// Transport double that pops scripted replies in order.
///
/// Replies can be enqueued per tool name (for `tools/call`) or per method;
/// tool-name queues are consulted first. An exhausted queue falls back to
/// the default reply, which is `{}` unless overridden.
#[derive(Default)]
pub struct FakeTransport {
    by_tool: Mutex<Vec<(String, VecDeque<FakeReply>)>>,
    by_method: Mutex<Vec<(String, VecDeque<FakeReply>)>>,
    default_reply: Mutex<Option<Value>>,
    calls: Mutex<Vec<RecordedCall>>,
    shutdowns: Mutex<u32>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for a named tool (matched on `tools/call`).
    pub fn push_tool_ok(&self, tool: &str, result: Value) {
        push(&mut self.by_tool.lock(), tool, FakeReply::Ok(result));
    }

    /// Queue an error reply for a named tool.
    pub fn push_tool_err(&self, tool: &str, error: ProtocolError) {
        push(&mut self.by_tool.lock(), tool, FakeReply::Err(error));
    }

    /// Queue a successful reply for a raw method (e.g. `tools/list`).
    pub fn push_method_ok(&self, method: &str, result: Value) {
        push(&mut self.by_method.lock(), method, FakeReply::Ok(result));
    }

    pub fn push_method_err(&self, method: &str, error: ProtocolError) {
        push(&mut self.by_method.lock(), method, FakeReply::Err(error));
    }

    /// Reply used when no scripted entry matches.
    pub fn set_default_reply(&self, value: Value) {
        *self.default_reply.lock() = Some(value);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls made to one tool, in order.
    pub fn tool_calls(&self, tool: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|c| {
                c.method == "tools/call"
                    && c.params.get("name").and_then(Value::as_str) == Some(tool)
            })
            .map(|c| c.params.get("arguments").cloned().unwrap_or(Value::Null))
            .collect()
    }

    pub fn shutdown_count(&self) -> u32 {
        *self.shutdowns.lock()
    }
}

fn push(queues: &mut Vec<(String, VecDeque<FakeReply>)>, key: &str, reply: FakeReply) {
    if let Some((_, queue)) = queues.iter_mut().find(|(k, _)| k == key) {
        queue.push_back(reply);
    } else {
        let mut queue = VecDeque::new();
        queue.push_back(reply);
        queues.push((key.to_string(), queue));
    }
}

fn pop(queues: &mut Vec<(String, VecDeque<FakeReply>)>, key: &str) -> Option<FakeReply> {
    queues
        .iter_mut()
        .find(|(k, _)| k == key)
        .and_then(|(_, queue)| queue.pop_front())
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn call(
        &self,
        method: &str,
        params: Value,
        _timeout: Duration,
    ) -> Result<Value, ProtocolError> {
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
        });

        let reply = if method == "tools/call" {
            params
                .get("name")
                .and_then(Value::as_str)
                .and_then(|tool| pop(&mut self.by_tool.lock(), tool))
                .or_else(|| pop(&mut self.by_method.lock(), method))
        } else {
            pop(&mut self.by_method.lock(), method)
        };

        match reply {
            Some(FakeReply::Ok(value)) => Ok(value),
            Some(FakeReply::Err(error)) => Err(error),
            None => Ok(self
                .default_reply
                .lock()
                .clone()
                .unwrap_or_else(|| Value::Object(Default::default()))),
        }
    }

    async fn shutdown(&self, _grace: Duration) {
        *self.shutdowns.lock() += 1;
    }
}
