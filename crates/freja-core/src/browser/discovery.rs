// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use freja_mcp::{BackendError, ToolDescriptor};
use tracing::debug;

use super::manager::BrowserManager;

/// Enumerate the tools currently available on the manager's session.
///
/// The result is never cached: capability sets differ between backend
/// versions and sessions, so every invocation queries the live connection.
/// Fails with [`BackendError::NotConnected`] when the session is not up.
pub async fn discover_tools(manager: &BrowserManager) -> Result<Vec<ToolDescriptor>, BackendError> {
    let descriptors = manager.list_backend_tools().await?;
    debug!(
        count = descriptors.len(),
        "discovered backend tools"
    );
    Ok(descriptors)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
