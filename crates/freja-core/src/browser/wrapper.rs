// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use async_trait::async_trait;
use freja_mcp::ToolDescriptor;
use freja_tools::{Tool, ToolCall, ToolEffect, ToolOutput, ToolSet, ToolSetError};
use serde_json::Value;

use super::manager::SessionHandle;

/// Backend tools that only read page state.  The protocol does not declare
/// side effects, so the effect class is derived from the name.
const READ_ONLY_TOOLS: &[&str] = &[
    "take_snapshot",
    "take_screenshot",
    "list_pages",
    "list_console_messages",
    "list_network_requests",
];

/// A discovered backend operation adapted to the [`Tool`] contract.
///
/// Invocation forwards through the [`SessionHandle`] to the exact session
/// that advertised the descriptor; once that session closes, every call
/// returns a stale-tool error as an ordinary failed tool result.
pub struct BackendTool {
    name: String,
    description: String,
    schema: Value,
    effect: ToolEffect,
    session: SessionHandle,
}

impl BackendTool {
    pub fn new(descriptor: ToolDescriptor, session: SessionHandle) -> Self {
        let effect = if READ_ONLY_TOOLS.contains(&descriptor.name.as_str()) {
            ToolEffect::Query
        } else {
            ToolEffect::Mutation
        };
        Self {
            name: descriptor.name,
            description: descriptor.description,
            schema: descriptor.input_schema,
            effect,
            session,
        }
    }
}

#[async_trait]
impl Tool for BackendTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.schema.clone()
    }

    fn effect(&self) -> ToolEffect {
        self.effect
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        match self.session.call(&self.name, call.args.clone()).await {
            Ok(result) if result.is_error => ToolOutput::err(&call.id, result.content),
            Ok(result) => ToolOutput::ok(&call.id, result.content),
            Err(e) => ToolOutput::err(&call.id, e.to_string()),
        }
    }
}

/// Adapt descriptors into a fresh tool set bound to `session`.
///
/// Pure mapping: one descriptor becomes one tool, order is preserved, and
/// a duplicate name from the backend is an error rather than a silent
/// overwrite.
pub fn wrap_tools(
    descriptors: &[ToolDescriptor],
    session: &SessionHandle,
) -> Result<ToolSet, ToolSetError> {
    let mut set = ToolSet::new();
    for descriptor in descriptors {
        set.push(Arc::new(BackendTool::new(descriptor.clone(), session.clone())))?;
    }
    Ok(set)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
