// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

/// Errors produced by the backend connection layer.
///
/// `Connection` and `Discovery` are fatal to the invocation that hit them
/// and propagate to the caller of the agent factory.  `Stale` is scoped to
/// a single tool call: a wrapped tool invoked after its originating session
/// closed reports it as an ordinary failed tool result.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend unreachable or the handshake failed
    #[error("backend connection failed: {0}")]
    Connection(String),

    /// An operation was attempted before `connect()`
    #[error("backend is not connected")]
    NotConnected,

    /// Tool enumeration failed on a connected backend
    #[error("tool discovery failed: {0}")]
    Discovery(String),

    /// The backend advertised a tool the wrapper cannot accept
    #[error("malformed tool descriptor at index {index}: {reason}")]
    MalformedDescriptor { index: usize, reason: String },

    /// The backend reported a tool-call failure at the protocol level
    #[error("tool call failed: {0}")]
    Call(String),

    /// The session that produced this tool has been closed
    #[error("tool session is closed")]
    Stale,

    /// A frame violated the wire protocol
    #[error("backend protocol error: {0}")]
    Protocol(String),

    /// `close()` itself failed; logged by the caller, never rethrown over a
    /// prior result
    #[error("backend close failed: {0}")]
    Close(String),
}
