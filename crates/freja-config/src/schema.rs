// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
}

/// Model selection forwarded verbatim into an agent definition.
///
/// The provider API itself is not part of this crate; an external execution
/// engine consumes these settings together with the built definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Provider identifier, e.g. "openai" | "anthropic" | "google"
    pub provider: String,
    /// Model name forwarded to the provider API
    pub name: String,
    /// Environment variable that holds the API key (read at runtime by the
    /// execution engine, never by this crate)
    pub api_key_env: Option<String>,
    /// Base URL override for local proxies
    pub base_url: Option<String>,
    /// Maximum tokens to request in a single completion
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0–2.0)
    pub temperature: Option<f32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            name: "gpt-4o".to_string(),
            api_key_env: None,
            base_url: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Maximum reasoning turns for the browser agent before the execution
    /// engine stops it
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Maximum turns for a delegated visual-agent run.  Visual tasks are
    /// single interactions (one click, one field), so the bound is short.
    #[serde(default = "default_visual_max_turns")]
    pub visual_max_turns: u32,
    /// System prompt override for the browser agent; None uses the built-in
    /// prompt
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_max_turns() -> u32 {
    50
}
fn default_visual_max_turns() -> u32 {
    12
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            visual_max_turns: default_visual_max_turns(),
            system_prompt: None,
        }
    }
}

/// Automation backend settings: the external MCP server process that
/// executes browser actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Command used to spawn the backend server
    #[serde(default = "default_backend_command")]
    pub command: String,
    /// Arguments passed to the backend command.  Coordinate-based tools
    /// (click_at, type_text) typically require an extra flag here, e.g.
    /// `--experimental-vision` for chrome-devtools-mcp.
    #[serde(default)]
    pub args: Vec<String>,
    /// Model override for the delegated visual agent.  Falls back to
    /// [`Config::model`] when unset.
    #[serde(default)]
    pub visual_model: Option<ModelSettings>,
}

fn default_backend_command() -> String {
    "chrome-devtools-mcp".to_string()
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            command: default_backend_command(),
            args: Vec::new(),
            visual_model: None,
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
