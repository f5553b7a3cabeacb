// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool-server transport: line-delimited JSON-RPC 2.0 over child-process stdio.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod protocol;
mod stdio;
mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use config::{ServerLaunch, ServersConfig, SERVER_NAME_PREFIX};
pub use protocol::{
    decode_response, encode_request, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams,
    ToolResponse,
};
pub use stdio::{StdioTransport, STDERR_READ_TIMEOUT};
pub use transport::{ProtocolError, Transport};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTransport;
