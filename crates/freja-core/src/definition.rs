// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use freja_config::{Config, ModelSettings};
use freja_tools::ToolSet;
use serde_json::{json, Value};

pub const BROWSER_AGENT_NAME: &str = "browser_agent";
pub const VISUAL_AGENT_NAME: &str = "visual_agent";

/// Where an agent runs.  Everything in this subsystem is `Local`; the tag
/// exists so the execution engine can route other kinds without inspecting
/// names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Local,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Local => write!(f, "local"),
        }
    }
}

/// Run bounds enforced by the execution engine.
#[derive(Debug, Clone)]
pub struct RunLimits {
    /// Maximum reasoning turns before the run is stopped
    pub max_turns: u32,
}

/// A reusable, tool-free agent base.
///
/// Blueprints are built once from config and overlaid with a freshly
/// discovered tool set per invocation, because the discovered capabilities differ
/// between backend sessions and versions, so the tools can never live here.
#[derive(Debug, Clone)]
pub struct AgentBlueprint {
    pub name: String,
    pub kind: AgentKind,
    pub description: String,
    pub model: ModelSettings,
    pub input_schema: Value,
    pub output_schema: Value,
    pub run: RunLimits,
    pub system_prompt: String,
}

impl AgentBlueprint {
    /// Overlay a tool set onto this blueprint, producing the immutable
    /// definition for one invocation.  The blueprint itself is not touched
    /// and can be reused with a different set.
    pub fn into_definition(&self, tools: ToolSet) -> AgentDefinition {
        AgentDefinition {
            name: self.name.clone(),
            kind: self.kind,
            description: self.description.clone(),
            model: self.model.clone(),
            input_schema: self.input_schema.clone(),
            output_schema: self.output_schema.clone(),
            run: self.run.clone(),
            system_prompt: self.system_prompt.clone(),
            tools,
        }
    }
}

/// A complete agent definition: identity, model selection, schemas, run
/// bounds, and the finalized tool list.  Constructed once per invocation;
/// never mutated afterwards.
#[derive(Debug)]
pub struct AgentDefinition {
    pub name: String,
    pub kind: AgentKind,
    pub description: String,
    pub model: ModelSettings,
    pub input_schema: Value,
    pub output_schema: Value,
    pub run: RunLimits,
    pub system_prompt: String,
    pub tools: ToolSet,
}

impl AgentDefinition {
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }
}

/// Shared result schema for browser task agents: a success flag, free-text
/// output, and an optional log of performed actions.
fn task_result_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "success": {
                "type": "boolean",
                "description": "Whether the task was completed"
            },
            "output": {
                "type": "string",
                "description": "Human-readable summary of what happened"
            },
            "actions": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Actions performed, in order"
            }
        },
        "required": ["success", "output"]
    })
}

const BROWSER_SYSTEM_PROMPT: &str = "\
You are a browser automation agent. You interact with web pages through \
semantic tools: take a snapshot first to see the page structure, then act \
on elements by their snapshot identifiers using click, fill and \
navigate_page. Re-snapshot after navigation or when the page changes. \
When an element cannot be addressed semantically (canvas content, custom \
widgets), delegate to the visual agent if that tool is available. Report \
what you did and whether the task succeeded.";

pub(crate) const VISUAL_SYSTEM_PROMPT: &str = "\
You are a visual browser agent operating on pixel coordinates. The page is \
presented to you as a screenshot; the origin (0, 0) is the top-left corner \
and coordinates grow right and down in CSS pixels. Available actions: \
click_at(x, y) clicks at a coordinate, type_text(text) types into the \
focused element, scroll moves the viewport. Perform exactly the requested \
interaction, then report the actions you took.";

/// Base definition for the browser agent (without tools).
pub fn browser_blueprint(config: &Config) -> AgentBlueprint {
    AgentBlueprint {
        name: BROWSER_AGENT_NAME.to_string(),
        kind: AgentKind::Local,
        description: "Performs web tasks through semantic browser tools".to_string(),
        model: config.model.clone(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "The web task to perform"
                }
            },
            "required": ["task"]
        }),
        output_schema: task_result_schema(),
        run: RunLimits { max_turns: config.agent.max_turns },
        system_prompt: config
            .agent
            .system_prompt
            .clone()
            .unwrap_or_else(|| BROWSER_SYSTEM_PROMPT.to_string()),
    }
}

/// Base definition for the delegated visual agent (without tools).
///
/// Visual tasks are single interactions, so the turn bound is short and the
/// model may differ from the browser agent's (coordinate-based action needs
/// a computer-use capable model).
pub fn visual_blueprint(config: &Config) -> AgentBlueprint {
    AgentBlueprint {
        name: VISUAL_AGENT_NAME.to_string(),
        kind: AgentKind::Local,
        description: "Performs coordinate-based browser interactions".to_string(),
        model: config
            .browser
            .visual_model
            .clone()
            .unwrap_or_else(|| config.model.clone()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "instruction": {
                    "type": "string",
                    "description": "The single interaction to perform"
                }
            },
            "required": ["instruction"]
        }),
        output_schema: task_result_schema(),
        run: RunLimits { max_turns: config.agent.visual_max_turns },
        system_prompt: VISUAL_SYSTEM_PROMPT.to_string(),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
