// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use freja_mcp::{Backend, BackendError, CallResult};
use serde_json::Value;
use tracing::{debug, warn};

/// Owns one backend connection for the duration of one agent invocation.
///
/// The manager is the only place the connection is opened or closed;
/// wrapped tools route through a [`SessionHandle`] that observes closure,
/// so a tool invoked after `close()` fails with a stale error instead of
/// reaching a dead (or wrong) session.  Managers are never shared across
/// concurrent invocations.
pub struct BrowserManager {
    backend: Arc<dyn Backend>,
    connected: AtomicBool,
    closed: Arc<AtomicBool>,
}

impl BrowserManager {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            connected: AtomicBool::new(false),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Establish the backend session.  Idempotent while the manager is
    /// open; fails once the manager has been closed.
    pub async fn ensure_connection(&self) -> Result<(), BackendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Connection(
                "manager has already been closed".to_string(),
            ));
        }
        self.backend.connect().await?;
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && !self.closed.load(Ordering::Acquire)
    }

    /// Routing handle bound to this manager's session.  Handles stay valid
    /// as values after `close()` but every call through them fails stale.
    pub fn session(&self) -> SessionHandle {
        SessionHandle {
            backend: self.backend.clone(),
            closed: self.closed.clone(),
        }
    }

    pub(crate) async fn list_backend_tools(
        &self,
    ) -> Result<Vec<freja_mcp::ToolDescriptor>, BackendError> {
        if !self.is_connected() {
            return Err(BackendError::NotConnected);
        }
        self.backend.list_tools().await
    }

    /// Close the session.  The first call closes the backend; later calls
    /// are no-ops, so cleanup paths may call this unconditionally.
    pub async fn close(&self) -> Result<(), BackendError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.connected.store(false, Ordering::Release);
        self.backend.close().await
    }

    /// Close and report failures through the log instead of the return
    /// path; a cleanup failure must never mask the result it follows.
    pub async fn cleanup(&self) {
        match self.close().await {
            Ok(()) => debug!("browser agent cleanup complete"),
            Err(e) => warn!("error during browser cleanup: {e}"),
        }
    }
}

/// Message-routing handle: delivers a tool invocation to the one backend
/// session that produced the tool, checking staleness first.
#[derive(Clone)]
pub struct SessionHandle {
    backend: Arc<dyn Backend>,
    closed: Arc<AtomicBool>,
}

impl SessionHandle {
    pub async fn call(&self, name: &str, args: Value) -> Result<CallResult, BackendError> {
        if self.is_closed() {
            return Err(BackendError::Stale);
        }
        self.backend.call_tool(name, args).await
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Scoped connection lifecycle: connect, run `body`, close on every exit
/// path.  A close failure is logged and never rethrown over `body`'s
/// result.  When the connect itself fails, the close is still attempted
/// (a no-op on an unopened backend) before the error propagates.
pub async fn with_connection<T, E, Fut>(
    manager: &BrowserManager,
    body: impl FnOnce() -> Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: From<BackendError>,
{
    let result = match manager.ensure_connection().await {
        Ok(()) => body().await,
        Err(e) => Err(E::from(e)),
    };
    if let Err(e) = manager.close().await {
        warn!("backend close failed: {e}");
    }
    result
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use freja_mcp::ToolDescriptor;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct CountingBackend {
        connects: AtomicUsize,
        closes: AtomicUsize,
        fail_close: bool,
    }

    #[async_trait]
    impl Backend for CountingBackend {
        async fn connect(&self) -> Result<(), BackendError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, BackendError> {
            Ok(Vec::new())
        }
        async fn call_tool(&self, name: &str, _args: Value) -> Result<CallResult, BackendError> {
            Ok(CallResult { content: format!("{name} ok"), is_error: false })
        }
        async fn close(&self) -> Result<(), BackendError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(BackendError::Close("simulated".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn ensure_connection_is_idempotent() {
        let backend = Arc::new(CountingBackend::default());
        let manager = BrowserManager::new(backend.clone());
        manager.ensure_connection().await.unwrap();
        manager.ensure_connection().await.unwrap();
        assert!(manager.is_connected());
    }

    #[tokio::test]
    async fn close_closes_backend_exactly_once() {
        let backend = Arc::new(CountingBackend::default());
        let manager = BrowserManager::new(backend.clone());
        manager.ensure_connection().await.unwrap();
        manager.close().await.unwrap();
        manager.close().await.unwrap();
        manager.cleanup().await;
        assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connect_after_close_fails() {
        let backend = Arc::new(CountingBackend::default());
        let manager = BrowserManager::new(backend);
        manager.close().await.unwrap();
        assert!(manager.ensure_connection().await.is_err());
    }

    #[tokio::test]
    async fn session_call_fails_stale_after_close() {
        let backend = Arc::new(CountingBackend::default());
        let manager = BrowserManager::new(backend);
        manager.ensure_connection().await.unwrap();
        let session = manager.session();
        assert!(session.call("click", json!({})).await.is_ok());

        manager.close().await.unwrap();
        let err = session.call("click", json!({})).await.unwrap_err();
        assert!(matches!(err, BackendError::Stale));
    }

    #[tokio::test]
    async fn with_connection_closes_on_success() {
        let backend = Arc::new(CountingBackend::default());
        let manager = BrowserManager::new(backend.clone());
        let out: Result<i32, BackendError> = with_connection(&manager, || async { Ok(7) }).await;
        assert_eq!(out.unwrap(), 7);
        assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn with_connection_closes_when_body_errors() {
        let backend = Arc::new(CountingBackend::default());
        let manager = BrowserManager::new(backend.clone());
        let out: Result<i32, BackendError> = with_connection(&manager, || async {
            Err(BackendError::Discovery("enumeration broke".to_string()))
        })
        .await;
        assert!(out.is_err());
        assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn with_connection_close_failure_does_not_mask_result() {
        let backend = Arc::new(CountingBackend { fail_close: true, ..Default::default() });
        let manager = BrowserManager::new(backend);
        let out: Result<i32, BackendError> = with_connection(&manager, || async { Ok(42) }).await;
        assert_eq!(out.unwrap(), 42);
    }
}
