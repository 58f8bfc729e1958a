// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! End-to-end tests for the browser agent factory.
//!
//! Each test drives [`build_browser_agent`] against an in-memory mock
//! backend and checks the shape of the resulting definition: which tools
//! were wrapped, whether the delegation tool was added, which warnings and
//! events were produced, and that the connection lifecycle held.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use freja_config::Config;
use freja_core::browser::{
    build_browser_agent, with_connection, BrowserManager, BuildError, DELEGATE_TOOL_NAME,
};
use freja_core::{AgentExecutor, BuildEvent, BuildProgress, TaskOutcome};
use freja_mcp::{Backend, BackendError, CallResult, ToolDescriptor};
use freja_tools::ToolCall;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

// ── Mock backend fixture ──────────────────────────────────────────────────────

const SEMANTIC_TOOLS: &[&str] = &["click", "fill", "navigate_page", "take_snapshot"];
const ALL_TOOLS: &[&str] =
    &["click", "fill", "navigate_page", "take_snapshot", "click_at", "type_text"];

struct MockBackend {
    tools: Vec<&'static str>,
    fail_connect: bool,
    connects: AtomicUsize,
    closes: AtomicUsize,
}

impl MockBackend {
    fn with_tools(tools: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            tools: tools.to_vec(),
            fail_connect: false,
            connects: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            tools: Vec::new(),
            fail_connect: true,
            connects: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn connect(&self) -> Result<(), BackendError> {
        if self.fail_connect {
            return Err(BackendError::Connection("backend unreachable".to_string()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, BackendError> {
        Ok(self
            .tools
            .iter()
            .map(|name| ToolDescriptor {
                name: name.to_string(),
                description: format!("backend tool {name}"),
                input_schema: json!({"type": "object"}),
            })
            .collect())
    }

    async fn call_tool(&self, name: &str, _args: Value) -> Result<CallResult, BackendError> {
        Ok(CallResult { content: format!("{name} done"), is_error: false })
    }

    async fn close(&self) -> Result<(), BackendError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct StubExecutor;

#[async_trait]
impl AgentExecutor for StubExecutor {
    async fn run(
        &self,
        _definition: &freja_core::AgentDefinition,
        _instruction: &str,
        _cancel: CancellationToken,
    ) -> anyhow::Result<TaskOutcome> {
        Ok(TaskOutcome { success: true, output: "done".to_string(), actions: None })
    }
}

async fn build(
    backend: Arc<MockBackend>,
) -> (Result<freja_core::browser::BrowserAgentBuild, BuildError>, Vec<BuildEvent>) {
    let (progress, mut rx) = BuildProgress::channel(32);
    let result = build_browser_agent(
        &Config::default(),
        backend,
        Arc::new(StubExecutor),
        progress,
        CancellationToken::new(),
    )
    .await;

    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    (result, events)
}

// ── Scenario A: semantic tools only ──────────────────────────────────────────

#[tokio::test]
async fn semantic_only_backend_builds_without_delegation() {
    let backend = MockBackend::with_tools(SEMANTIC_TOOLS);
    let (result, events) = build(backend).await;
    let built = result.unwrap();

    assert_eq!(built.definition.tools.len(), 4);
    assert!(!built.definition.tools.contains(DELEGATE_TOOL_NAME));
    // Semantic tier satisfied: no warning on the result.
    assert!(built.warnings.is_empty());
    // The visual-disabled notice is still emitted.
    assert!(events
        .iter()
        .any(|e| matches!(e, BuildEvent::VisualDelegationDisabled { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, BuildEvent::SemanticToolsMissing { .. })));
}

// ── Scenario B: full tool set ────────────────────────────────────────────────

#[tokio::test]
async fn full_backend_gains_exactly_one_delegation_tool() {
    let backend = MockBackend::with_tools(ALL_TOOLS);
    let (result, events) = build(backend).await;
    let built = result.unwrap();

    assert_eq!(built.definition.tools.len(), 7);
    let delegate_count = built
        .definition
        .tool_names()
        .iter()
        .filter(|n| n.as_str() == DELEGATE_TOOL_NAME)
        .count();
    assert_eq!(delegate_count, 1);
    assert!(built.warnings.is_empty());
    assert!(events
        .iter()
        .any(|e| matches!(e, BuildEvent::VisualDelegationEnabled)));
}

#[tokio::test]
async fn wrapped_names_mirror_discovery_order() {
    let backend = MockBackend::with_tools(ALL_TOOLS);
    let (result, _) = build(backend).await;
    let built = result.unwrap();

    let names = built.definition.tool_names();
    assert_eq!(&names[..6], ALL_TOOLS);
    assert_eq!(names[6], DELEGATE_TOOL_NAME);
}

// ── Scenario C: degraded backend ─────────────────────────────────────────────

#[tokio::test]
async fn degraded_backend_still_builds_with_warning() {
    let backend = MockBackend::with_tools(&["click"]);
    let (result, events) = build(backend).await;
    let built = result.unwrap();

    assert_eq!(built.definition.tools.len(), 1);
    assert!(!built.definition.tools.contains(DELEGATE_TOOL_NAME));

    assert_eq!(built.warnings.len(), 1);
    assert_eq!(built.warnings[0].tier, "semantic");
    assert_eq!(built.warnings[0].missing, vec!["fill", "navigate_page", "take_snapshot"]);

    assert!(events
        .iter()
        .any(|e| matches!(e, BuildEvent::SemanticToolsMissing { .. })));

    // The degraded agent is still runnable: its one tool executes.
    let call = ToolCall { id: "t1".into(), name: "click".into(), args: json!({}) };
    let out = built.definition.tools.execute(&call).await;
    assert!(!out.is_error);
}

// ── Scenario D: connection failure ───────────────────────────────────────────

#[tokio::test]
async fn connect_failure_aborts_build_and_still_cleans_up() {
    let backend = MockBackend::failing();
    let (result, _) = build(backend.clone()).await;

    assert!(matches!(result, Err(BuildError::Connection(_))));
    // The cleanup path still attempted the (no-op) close, exactly once.
    assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
}

// ── Isolation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_builds_share_no_tool_instances() {
    let (first, _) = build(MockBackend::with_tools(ALL_TOOLS)).await;
    let (second, _) = build(MockBackend::with_tools(ALL_TOOLS)).await;
    let first = first.unwrap();
    let second = second.unwrap();

    for a in first.definition.tools.iter() {
        for b in second.definition.tools.iter() {
            assert!(
                !Arc::ptr_eq(a, b),
                "tool instance {} shared across definitions",
                a.name()
            );
        }
    }
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scoped_invocation_closes_exactly_once() {
    let backend = MockBackend::with_tools(SEMANTIC_TOOLS);
    let manager = BrowserManager::new(backend.clone());

    let result: Result<usize, BackendError> = with_connection(&manager, || async {
        Ok(SEMANTIC_TOOLS.len())
    })
    .await;
    assert_eq!(result.unwrap(), 4);
    assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scoped_invocation_closes_once_when_body_fails_early() {
    let backend = MockBackend::with_tools(SEMANTIC_TOOLS);
    let manager = BrowserManager::new(backend.clone());

    let result: Result<usize, BackendError> = with_connection(&manager, || async {
        Err(BackendError::Discovery("failed before discovery finished".to_string()))
    })
    .await;
    assert!(result.is_err());
    assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn tools_go_stale_when_the_invocation_ends() {
    let backend = MockBackend::with_tools(SEMANTIC_TOOLS);
    let (result, _) = build(backend).await;
    let built = result.unwrap();

    built.manager.cleanup().await;

    let call = ToolCall { id: "t2".into(), name: "click".into(), args: json!({}) };
    let out = built.definition.tools.execute(&call).await;
    assert!(out.is_error);
    assert!(out.content.contains("session is closed"));
}

// ── Cancellation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn pre_cancelled_build_never_connects() {
    let backend = MockBackend::with_tools(SEMANTIC_TOOLS);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = build_browser_agent(
        &Config::default(),
        backend.clone(),
        Arc::new(StubExecutor),
        BuildProgress::disabled(),
        cancel,
    )
    .await;

    assert!(matches!(result, Err(BuildError::Cancelled)));
    assert_eq!(backend.connects.load(Ordering::SeqCst), 0);
}
