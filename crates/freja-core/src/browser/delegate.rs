// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use async_trait::async_trait;
use freja_mcp::ToolDescriptor;
use freja_tools::{Tool, ToolCall, ToolEffect, ToolOutput, ToolSet};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::capability::VISUAL_TIER;
use super::manager::SessionHandle;
use super::wrapper::wrap_tools;
use crate::definition::AgentBlueprint;
use crate::executor::AgentExecutor;

pub const DELEGATE_TOOL_NAME: &str = "delegate_to_visual_agent";

/// Tool that hands a single interaction to the visual sub-agent.
///
/// Built only when the visual tier is satisfied; an agent whose backend
/// lacks coordinate tools simply never sees this tool in its list.
pub struct DelegateVisualTool {
    blueprint: AgentBlueprint,
    /// Visual-tier descriptors captured at build time; re-wrapped into a
    /// fresh tool set on every delegation so the sub-agent never shares
    /// tool instances with its parent.
    descriptors: Vec<ToolDescriptor>,
    session: SessionHandle,
    executor: Arc<dyn AgentExecutor>,
    cancel: CancellationToken,
}

/// Construct the delegation tool, or `None` when the visual tier is not
/// satisfied by the discovered tools.
pub fn build_delegation_tool(
    blueprint: AgentBlueprint,
    discovered: &[ToolDescriptor],
    base_tools: &ToolSet,
    session: SessionHandle,
    executor: Arc<dyn AgentExecutor>,
    cancel: CancellationToken,
) -> Option<Arc<dyn Tool>> {
    let report = VISUAL_TIER.validate(base_tools);
    if !report.satisfied {
        return None;
    }
    let descriptors: Vec<ToolDescriptor> = discovered
        .iter()
        .filter(|d| VISUAL_TIER.required.contains(&d.name.as_str()))
        .cloned()
        .collect();
    Some(Arc::new(DelegateVisualTool {
        blueprint,
        descriptors,
        session,
        executor,
        cancel,
    }))
}

#[async_trait]
impl Tool for DelegateVisualTool {
    fn name(&self) -> &str {
        DELEGATE_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Delegate a single interaction to the visual agent, which acts on \
         pixel coordinates from a screenshot. Use this when an element \
         cannot be addressed through the page snapshot (canvas content, \
         custom widgets). Describe exactly one interaction per call."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "instruction": {
                    "type": "string",
                    "description": "The single interaction to perform, e.g. \
                                    'click the red Submit button'"
                }
            },
            "required": ["instruction"]
        })
    }

    fn effect(&self) -> ToolEffect {
        ToolEffect::Delegation
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let instruction = match call.args.get("instruction").and_then(Value::as_str) {
            Some(i) => i.to_string(),
            None => return ToolOutput::err(&call.id, "missing 'instruction'"),
        };

        // Fresh wrap per delegation: the visual agent gets its own tool
        // instances on the shared session, and its blueprint carries no
        // delegation tool, so it cannot delegate further.
        let tools = match wrap_tools(&self.descriptors, &self.session) {
            Ok(t) => t,
            Err(e) => return ToolOutput::err(&call.id, format!("building visual tool set: {e}")),
        };
        let definition = self.blueprint.into_definition(tools);

        debug!(agent = %definition.name, %instruction, "delegating to visual agent");

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return ToolOutput::err(&call.id, "visual delegation cancelled");
            }
            result = self.executor.run(&definition, &instruction, self.cancel.child_token()) => {
                result
            }
        };

        match outcome {
            Ok(outcome) => match serde_json::to_string(&outcome) {
                Ok(payload) => ToolOutput::ok(&call.id, payload),
                Err(e) => ToolOutput::err(&call.id, format!("serializing visual result: {e}")),
            },
            Err(e) => ToolOutput::err(&call.id, format!("visual agent error: {e}")),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
