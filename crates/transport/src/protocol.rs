// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC 2.0 request/response DTOs and the tool-call envelope.

use crate::transport::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One request line. `id` is assigned monotonically per transport instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Error object carried inside a failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One response line: `result` xor `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// Parameters for the `tools/call` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Value,
}

/// Serialize a request to one wire line (newline appended by the writer).
pub fn encode_request(request: &JsonRpcRequest) -> Result<String, ProtocolError> {
    serde_json::to_string(request).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// Parse one wire line into a response, validating the id.
pub fn decode_response(line: &str, want_id: u64) -> Result<Value, ProtocolError> {
    let response: JsonRpcResponse =
        serde_json::from_str(line).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    if response.id != want_id {
        return Err(ProtocolError::IdMismatch {
            want: want_id,
            got: response.id,
        });
    }
    if let Some(error) = response.error {
        return Err(ProtocolError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| ProtocolError::Malformed("response carries neither result nor error".into()))
}

/// A tool-call result in either accepted shape.
///
/// Servers commonly wrap text in `{content: [{type: "text", text}]}`; raw
/// JSON results pass through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    /// Concatenated text payload from a content envelope.
    Text(String),
    /// Raw JSON result.
    Raw(Value),
}

impl ToolResponse {
    /// Classify a `result` value, unwrapping the content envelope when present.
    pub fn from_result(value: Value) -> Self {
        if let Some(items) = value.get("content").and_then(Value::as_array) {
            let mut text = String::new();
            let mut any_text = false;
            for item in items {
                if item.get("type").and_then(Value::as_str) == Some("text") {
                    if let Some(t) = item.get("text").and_then(Value::as_str) {
                        text.push_str(t);
                        any_text = true;
                    }
                }
            }
            if any_text {
                return ToolResponse::Text(text);
            }
        }
        ToolResponse::Raw(value)
    }

    /// The text payload, or the raw value rendered as compact JSON.
    pub fn into_text(self) -> String {
        match self {
            ToolResponse::Text(t) => t,
            ToolResponse::Raw(v) => v.to_string(),
        }
    }

    /// The payload as JSON: text envelopes are parsed when they contain JSON,
    /// otherwise wrapped as a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            ToolResponse::Raw(v) => v,
            ToolResponse::Text(t) => {
                serde_json::from_str(&t).unwrap_or_else(|_| Value::String(t))
            }
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
