// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! `freja-mcp` — MCP (Model Context Protocol) client for freja.
//!
//! Connects to an automation backend (e.g. a browser-control MCP server)
//! over **stdio** transport using line-delimited JSON-RPC, and exposes it
//! through the [`Backend`] trait: an opaque capability provider with
//! `connect` / `list_tools` / `call_tool` / `close`.
//!
//! # Architecture
//!
//! ```text
//! BrowserManager (freja-core)
//!       │  Backend trait
//!       ▼
//! StdioBackend
//!       │  stdin/stdout (line-delimited JSON-RPC 2.0)
//!       ▼
//! automation backend process (chrome-devtools-mcp, …)
//! ```
//!
//! Tool descriptors coming back from `tools/list` are validated at this
//! boundary: entries with an empty name or a non-object input schema are
//! rejected with [`BackendError::MalformedDescriptor`] instead of being
//! passed upward as ambiguous values.

mod backend;
mod error;
mod stdio;
mod wire;

pub use backend::{Backend, CallResult, ToolDescriptor};
pub use error::BackendError;
pub use stdio::StdioBackend;
