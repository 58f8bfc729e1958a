// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Factory for browser agent definitions.
//!
//! Called when the browser agent is invoked via delegation from a parent.
//! Opens the backend session, discovers and wraps the tools into the
//! agent's isolated set, validates capability tiers, and conditionally adds
//! the visual-delegation tool.  The wrapped tools live only in the returned
//! definition and are never visible to any other agent.

use std::sync::Arc;

use freja_config::Config;
use freja_mcp::{Backend, BackendError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::capability::{SEMANTIC_TIER, VISUAL_TIER};
use super::delegate::build_delegation_tool;
use super::discovery::discover_tools;
use super::manager::BrowserManager;
use super::wrapper::wrap_tools;
use crate::definition::{browser_blueprint, visual_blueprint, AgentDefinition};
use crate::events::{BuildEvent, BuildProgress};
use crate::executor::AgentExecutor;

/// Phases of one agent invocation.  The factory drives the build up to
/// `Ready`; `Running` through `Completed`/`Failed` belong to the execution
/// engine, and `Closed` is reachable from any phase through the manager's
/// cleanup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Uninitialized,
    Connecting,
    Discovering,
    Validating,
    Ready,
    Running,
    Completed,
    Failed,
    Closed,
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BuildPhase::Uninitialized => "uninitialized",
            BuildPhase::Connecting => "connecting",
            BuildPhase::Discovering => "discovering",
            BuildPhase::Validating => "validating",
            BuildPhase::Ready => "ready",
            BuildPhase::Running => "running",
            BuildPhase::Completed => "completed",
            BuildPhase::Failed => "failed",
            BuildPhase::Closed => "closed",
        };
        write!(f, "{name}")
    }
}

/// Fatal build failures.  Capability gaps are not errors: they change
/// what gets built, not whether building succeeds.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("connection failed: {0}")]
    Connection(#[source] BackendError),

    #[error("tool discovery failed: {0}")]
    Discovery(#[source] BackendError),

    #[error("build cancelled")]
    Cancelled,
}

impl From<BackendError> for BuildError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Connection(_)
            | BackendError::NotConnected
            | BackendError::Stale
            | BackendError::Close(_) => BuildError::Connection(e),
            BackendError::Discovery(_)
            | BackendError::MalformedDescriptor { .. }
            | BackendError::Protocol(_)
            | BackendError::Call(_) => BuildError::Discovery(e),
        }
    }
}

/// A non-fatal capability gap attached to a successful build.
#[derive(Debug, Clone)]
pub struct CapabilityWarning {
    pub tier: &'static str,
    pub missing: Vec<String>,
}

impl std::fmt::Display for CapabilityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} tools missing: {}", self.tier, self.missing.join(", "))
    }
}

/// A successful build: the definition, the manager that owns the live
/// session (the caller closes it when the invocation ends), and any
/// non-fatal capability warnings.
pub struct BrowserAgentBuild {
    pub definition: AgentDefinition,
    pub manager: Arc<BrowserManager>,
    pub warnings: Vec<CapabilityWarning>,
}

fn advance(phase: &mut BuildPhase, next: BuildPhase) {
    debug!(from = %phase, to = %next, "build phase");
    *phase = next;
}

/// Failure path shared by every abort: mark the build failed, run the
/// cleanup close, and land in `Closed` no matter which phase we came from.
async fn abort_build(phase: &mut BuildPhase, manager: &BrowserManager) {
    advance(phase, BuildPhase::Failed);
    manager.cleanup().await;
    advance(phase, BuildPhase::Closed);
}

/// Build a browser agent definition against a live backend.
///
/// On success the returned manager holds an open session that the
/// definition's tools route through; the caller is responsible for closing
/// it (directly, via [`BrowserManager::cleanup`], or by scoping the whole
/// invocation in [`super::with_connection`]).  On failure the session is
/// already closed.
pub async fn build_browser_agent(
    config: &Config,
    backend: Arc<dyn Backend>,
    executor: Arc<dyn AgentExecutor>,
    progress: BuildProgress,
    cancel: CancellationToken,
) -> Result<BrowserAgentBuild, BuildError> {
    let mut phase = BuildPhase::Uninitialized;
    let manager = Arc::new(BrowserManager::new(backend));

    if cancel.is_cancelled() {
        return Err(BuildError::Cancelled);
    }

    advance(&mut phase, BuildPhase::Connecting);
    let connected = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            abort_build(&mut phase, &manager).await;
            return Err(BuildError::Cancelled);
        }
        result = manager.ensure_connection() => result,
    };
    if let Err(e) = connected {
        abort_build(&mut phase, &manager).await;
        return Err(BuildError::Connection(e));
    }
    progress.emit(BuildEvent::Connected);

    advance(&mut phase, BuildPhase::Discovering);
    let discovered = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            abort_build(&mut phase, &manager).await;
            return Err(BuildError::Cancelled);
        }
        result = discover_tools(&manager) => result,
    };
    let descriptors = match discovered {
        Ok(d) => d,
        Err(e) => {
            abort_build(&mut phase, &manager).await;
            return Err(BuildError::Discovery(e));
        }
    };

    let session = manager.session();
    let mut tools = match wrap_tools(&descriptors, &session) {
        Ok(t) => t,
        Err(e) => {
            abort_build(&mut phase, &manager).await;
            return Err(BuildError::Discovery(BackendError::Discovery(e.to_string())));
        }
    };
    progress.emit(BuildEvent::ToolsDiscovered { count: tools.len() });

    if cancel.is_cancelled() {
        abort_build(&mut phase, &manager).await;
        return Err(BuildError::Cancelled);
    }

    advance(&mut phase, BuildPhase::Validating);
    let mut warnings = Vec::new();

    let semantic = SEMANTIC_TIER.validate(&tools);
    if !semantic.satisfied {
        warn!(
            missing = ?semantic.missing,
            "semantic tools missing; some browser interactions may not work"
        );
        progress.emit(BuildEvent::SemanticToolsMissing { missing: semantic.missing.clone() });
        warnings.push(CapabilityWarning { tier: SEMANTIC_TIER.name, missing: semantic.missing });
    }

    match build_delegation_tool(
        visual_blueprint(config),
        &descriptors,
        &tools,
        session,
        executor,
        cancel.clone(),
    ) {
        Some(tool) => {
            // The backend advertising a tool under the delegation tool's
            // own name would collide here; skip delegation rather than
            // fail the build.
            match tools.push(tool) {
                Ok(()) => progress.emit(BuildEvent::VisualDelegationEnabled),
                Err(e) => warn!("cannot add delegation tool: {e}"),
            }
        }
        None => {
            let report = VISUAL_TIER.validate(&tools);
            debug!(
                missing = ?report.missing,
                "visual tools missing; visual agent delegation disabled"
            );
            progress.emit(BuildEvent::VisualDelegationDisabled { missing: report.missing });
        }
    }

    advance(&mut phase, BuildPhase::Ready);
    let definition = browser_blueprint(config).into_definition(tools);
    debug!(
        agent = %definition.name,
        tools = ?definition.tool_names(),
        "browser agent definition ready"
    );

    Ok(BrowserAgentBuild { definition, manager, warnings })
}
