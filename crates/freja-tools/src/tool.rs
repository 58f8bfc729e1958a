// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::Value;

/// A single tool invocation requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Opaque identifier returned by the model (forwarded verbatim)
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments
    pub args: Value,
}

/// The result of executing a tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub call_id: String,
    pub content: String,
    /// If true, the tool execution failed non-fatally (returned error message).
    pub is_error: bool,
}

impl ToolOutput {
    /// Successful plain-text result.
    pub fn ok(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Error result containing a plain-text error message.
    pub fn err(call_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: msg.into(),
            is_error: true,
        }
    }
}

/// Declared effect class of a tool.
///
/// The execution engine applies different accounting to each class:
/// `Delegation` runs spawn a whole sub-agent with its own budget, so they
/// must be distinguishable from ordinary backend calls without matching on
/// tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEffect {
    /// Read-only query against the backend session
    Query,
    /// Mutates backend state (click, fill, navigate, …)
    Mutation,
    /// Spawns a delegated sub-agent run
    Delegation,
}

impl std::fmt::Display for ToolEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolEffect::Query => write!(f, "query"),
            ToolEffect::Mutation => write!(f, "mutation"),
            ToolEffect::Delegation => write!(f, "delegation"),
        }
    }
}

/// A tool schema as handed to the model layer.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Trait that every callable tool must implement.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for parameters
    fn parameters_schema(&self) -> Value;
    /// Declared effect class
    fn effect(&self) -> ToolEffect;
    /// Execute the tool.  Errors should be wrapped in [`ToolOutput::err`].
    async fn execute(&self, call: &ToolCall) -> ToolOutput;
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_output_carries_content() {
        let out = ToolOutput::ok("c1", "done");
        assert_eq!(out.call_id, "c1");
        assert_eq!(out.content, "done");
        assert!(!out.is_error);
    }

    #[test]
    fn err_output_sets_flag() {
        let out = ToolOutput::err("c2", "boom");
        assert!(out.is_error);
        assert_eq!(out.content, "boom");
    }

    #[test]
    fn effect_display_names() {
        assert_eq!(ToolEffect::Query.to_string(), "query");
        assert_eq!(ToolEffect::Mutation.to_string(), "mutation");
        assert_eq!(ToolEffect::Delegation.to_string(), "delegation");
    }
}
