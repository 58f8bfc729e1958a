// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use freja_tools::ToolSet;

/// A statically declared set of tool names required to unlock a feature.
///
/// Tiers are data, not behaviour: validation is a pure function over name
/// sets.  What a gap means is decided by the factory: a semantic gap
/// degrades the agent, a visual gap suppresses delegation.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityTier {
    pub name: &'static str,
    pub required: &'static [&'static str],
}

/// Snapshot-addressed interaction: the browser agent cannot do useful work
/// without these.
pub const SEMANTIC_TIER: CapabilityTier = CapabilityTier {
    name: "semantic",
    required: &["click", "fill", "navigate_page", "take_snapshot"],
};

/// Coordinate-based interaction: required before visual delegation is
/// offered.  Backends typically gate these behind an opt-in flag.
pub const VISUAL_TIER: CapabilityTier = CapabilityTier {
    name: "visual",
    required: &["click_at", "type_text"],
};

/// Result of validating one tier against a tool set.
#[derive(Debug, Clone)]
pub struct TierReport {
    pub satisfied: bool,
    /// Absent required names, in the tier's declared order
    pub missing: Vec<String>,
}

impl CapabilityTier {
    pub fn validate(&self, tools: &ToolSet) -> TierReport {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !tools.contains(name))
            .map(|name| name.to_string())
            .collect();
        TierReport { satisfied: missing.is_empty(), missing }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
