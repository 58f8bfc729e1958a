// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::definition::AgentDefinition;

/// Structured result of a delegated agent run.
///
/// `actions` is omitted from the serialized form when the agent did not
/// report one, matching the optional field in the result schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
}

/// Seam to the reasoning engine that actually runs an agent.
///
/// The composition subsystem never drives the model loop itself; it hands a
/// finished [`AgentDefinition`] plus an instruction across this boundary.
/// Implementations must honour the cancellation token: when it fires, abort
/// the in-flight run and return promptly so the caller's cleanup can run.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn run(
        &self,
        definition: &AgentDefinition,
        instruction: &str,
        cancel: CancellationToken,
    ) -> anyhow::Result<TaskOutcome>;
}

/// Executor used where no engine is wired (inspection commands, tests).
/// Every run fails, which surfaces as an ordinary failed tool result.
pub struct NullExecutor;

#[async_trait]
impl AgentExecutor for NullExecutor {
    async fn run(
        &self,
        definition: &AgentDefinition,
        _instruction: &str,
        _cancel: CancellationToken,
    ) -> anyhow::Result<TaskOutcome> {
        anyhow::bail!("no execution engine configured for agent '{}'", definition.name)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
