// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use tokio::sync::mpsc;

/// Coarse milestones emitted while an agent definition is being built.
/// Consumers (CLI, UI) subscribe to these to narrate progress; nothing in
/// the build path depends on them being received.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    /// The backend session is up
    Connected,
    /// Tool discovery finished
    ToolsDiscovered { count: usize },
    /// Required semantic tools are missing; the agent still builds
    SemanticToolsMissing { missing: Vec<String> },
    /// Visual tools are missing, so the delegation tool was not built
    VisualDelegationDisabled { missing: Vec<String> },
    /// The visual delegation tool was added to the tool list
    VisualDelegationEnabled,
}

impl std::fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildEvent::Connected => {
                write!(f, "Browser connected with an isolated tool session.")
            }
            BuildEvent::ToolsDiscovered { count } => {
                write!(f, "Discovered {count} browser tools.")
            }
            BuildEvent::SemanticToolsMissing { missing } => write!(
                f,
                "Semantic tools missing ({}); some browser interactions may not work.",
                missing.join(", ")
            ),
            BuildEvent::VisualDelegationDisabled { missing } => write!(
                f,
                "Visual tools unavailable ({}); coordinate-based actions disabled.",
                missing.join(", ")
            ),
            BuildEvent::VisualDelegationEnabled => {
                write!(f, "Visual agent delegation enabled.")
            }
        }
    }
}

/// Optional progress sink handed to the factory.
///
/// A disabled sink drops events on the floor; a full channel drops the
/// event rather than blocking the build.
#[derive(Debug, Clone, Default)]
pub struct BuildProgress {
    tx: Option<mpsc::Sender<BuildEvent>>,
}

impl BuildProgress {
    /// A sink wired to a channel; returns the receiving half.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<BuildEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: BuildEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(event);
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
