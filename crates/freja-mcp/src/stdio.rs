// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Stdio transport: spawns the backend server as a child process and talks
//! line-delimited JSON-RPC 2.0 over its stdin/stdout.
//!
//! A single reader task owns the child's stdout and routes responses to
//! pending requests by id.  Unparseable frames and server-initiated
//! notifications are skipped with a log line; they must not tear down the
//! session.  When the child closes its stdout, every pending request is
//! failed with a connection error so callers never hang.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::{Backend, CallResult, ToolDescriptor};
use crate::error::BackendError;
use crate::wire::{CallToolResult, Frame, ListToolsResult, Notification, Request};

const PROTOCOL_VERSION: &str = "2024-11-05";

type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<Result<Value, BackendError>>>>>;

struct Session {
    child: Child,
    stdin: Arc<Mutex<ChildStdin>>,
    pending: Pending,
    reader: JoinHandle<()>,
}

/// MCP client backed by a spawned child process.
///
/// `connect()` spawns the process and performs the `initialize` handshake;
/// it is idempotent while the session is live.  `close()` kills the child
/// exactly once and fails any in-flight requests with a stale error.
pub struct StdioBackend {
    command: String,
    args: Vec<String>,
    session: Mutex<Option<Session>>,
    closed: AtomicBool,
}

impl StdioBackend {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            session: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Send a request and await its response.
    async fn request(&self, method: &str, params: Value) -> Result<Value, BackendError> {
        let (stdin, pending) = {
            let guard = self.session.lock().await;
            let session = guard.as_ref().ok_or(BackendError::NotConnected)?;
            (session.stdin.clone(), session.pending.clone())
        };

        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        pending.lock().await.insert(id.clone(), tx);

        let line = serde_json::to_string(&Request {
            jsonrpc: "2.0",
            id: &id,
            method,
            params,
        })
        .map_err(|e| BackendError::Protocol(e.to_string()))?;

        if let Err(e) = self.write_line(&stdin, &line).await {
            pending.lock().await.remove(&id);
            return Err(e);
        }

        // The sender half is dropped when close() drains the pending map,
        // so a closed session resolves as Stale instead of hanging here.
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Stale),
        }
    }

    /// Send a notification (no response expected).
    async fn notify(&self, method: &str, params: Value) -> Result<(), BackendError> {
        let stdin = {
            let guard = self.session.lock().await;
            let session = guard.as_ref().ok_or(BackendError::NotConnected)?;
            session.stdin.clone()
        };
        let line = serde_json::to_string(&Notification {
            jsonrpc: "2.0",
            method,
            params,
        })
        .map_err(|e| BackendError::Protocol(e.to_string()))?;
        self.write_line(&stdin, &line).await
    }

    async fn write_line(
        &self,
        stdin: &Arc<Mutex<ChildStdin>>,
        line: &str,
    ) -> Result<(), BackendError> {
        let mut w = stdin.lock().await;
        w.write_all(line.as_bytes())
            .await
            .map_err(|e| BackendError::Connection(format!("write to backend: {e}")))?;
        w.write_all(b"\n")
            .await
            .map_err(|e| BackendError::Connection(format!("write to backend: {e}")))?;
        w.flush()
            .await
            .map_err(|e| BackendError::Connection(format!("flush to backend: {e}")))?;
        Ok(())
    }

    async fn handshake(&self) -> Result<(), BackendError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "freja",
                "version": env!("CARGO_PKG_VERSION"),
            },
        });
        self.request("initialize", params)
            .await
            .map_err(|e| BackendError::Connection(format!("initialize handshake: {e}")))?;
        self.notify("notifications/initialized", json!({}))
            .await
            .map_err(|e| BackendError::Connection(format!("initialized notification: {e}")))?;
        Ok(())
    }

    /// Tear down a half-open session (handshake failure path).
    async fn teardown(&self) {
        if let Some(mut session) = self.session.lock().await.take() {
            session.reader.abort();
            let _ = session.child.kill().await;
        }
    }
}

#[async_trait::async_trait]
impl Backend for StdioBackend {
    async fn connect(&self) -> Result<(), BackendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Connection(
                "session has already been closed".to_string(),
            ));
        }

        {
            let mut guard = self.session.lock().await;
            if guard.is_some() {
                return Ok(());
            }

            debug!(command = %self.command, "spawning automation backend");
            let mut child = Command::new(&self.command)
                .args(&self.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| {
                    BackendError::Connection(format!("spawning {}: {e}", self.command))
                })?;

            let stdin = child
                .stdin
                .take()
                .ok_or_else(|| BackendError::Connection("backend stdin unavailable".into()))?;
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| BackendError::Connection("backend stdout unavailable".into()))?;

            let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
            let reader = tokio::spawn(read_loop(stdout, pending.clone()));

            *guard = Some(Session {
                child,
                stdin: Arc::new(Mutex::new(stdin)),
                pending,
                reader,
            });
        }

        if let Err(e) = self.handshake().await {
            self.teardown().await;
            return Err(e);
        }
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, BackendError> {
        let result = self
            .request("tools/list", json!({}))
            .await
            .map_err(|e| match e {
                BackendError::NotConnected | BackendError::Stale => e,
                other => BackendError::Discovery(other.to_string()),
            })?;

        let parsed: ListToolsResult = serde_json::from_value(result)
            .map_err(|e| BackendError::Discovery(format!("invalid tools/list result: {e}")))?;

        parsed
            .tools
            .into_iter()
            .enumerate()
            .map(|(i, raw)| ToolDescriptor::from_raw(i, raw))
            .collect()
    }

    async fn call_tool(&self, name: &str, args: Value) -> Result<CallResult, BackendError> {
        let result = self
            .request("tools/call", json!({ "name": name, "arguments": args }))
            .await?;

        let parsed: CallToolResult = serde_json::from_value(result)
            .map_err(|e| BackendError::Protocol(format!("invalid tools/call result: {e}")))?;

        Ok(CallResult {
            content: parsed.text(),
            is_error: parsed.is_error,
        })
    }

    async fn close(&self) -> Result<(), BackendError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let session = self.session.lock().await.take();
        if let Some(mut session) = session {
            session.reader.abort();
            for (_, tx) in session.pending.lock().await.drain() {
                let _ = tx.send(Err(BackendError::Stale));
            }
            session
                .child
                .kill()
                .await
                .map_err(|e| BackendError::Close(e.to_string()))?;
        }
        Ok(())
    }
}

/// Reader task: routes response frames to their pending requests.
async fn read_loop(stdout: ChildStdout, pending: Pending) {
    let mut lines = FramedRead::new(stdout, LinesCodec::new());

    while let Some(frame) = lines.next().await {
        let line = match frame {
            Ok(l) => l,
            Err(e) => {
                warn!("backend read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let frame: Frame = match serde_json::from_str(&line) {
            Ok(f) => f,
            Err(e) => {
                warn!("unparseable frame from backend: {e}");
                continue;
            }
        };

        // Server-initiated requests and notifications are not part of the
        // contract this client depends on.
        if frame.id.is_none() {
            if let Some(method) = frame.method {
                debug!(%method, "ignoring server notification");
            }
            continue;
        }

        let id = match frame.id.as_ref().and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => {
                warn!("response frame with non-string id");
                continue;
            }
        };

        let result = match (frame.result, frame.error) {
            (Some(value), None) => Ok(value),
            (_, Some(err)) => Err(BackendError::Call(format!("{} ({})", err.message, err.code))),
            (None, None) => Err(BackendError::Protocol(
                "response frame without result or error".to_string(),
            )),
        };

        if let Some(tx) = pending.lock().await.remove(&id) {
            let _ = tx.send(result);
        } else {
            debug!(%id, "response for unknown request id");
        }
    }

    // EOF or read error: nothing else will answer these requests.
    for (_, tx) in pending.lock().await.drain() {
        let _ = tx.send(Err(BackendError::Connection(
            "backend closed the connection".to_string(),
        )));
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
