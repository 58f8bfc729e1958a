// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;
use crate::wire::RawToolDescriptor;

/// A callable operation advertised by the backend, validated at this
/// boundary.  Produced fresh on every discovery call; descriptors are
/// never cached across connections, because the available tool set may
/// change backend-to-backend or version-to-version.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the tool's arguments
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Validate a raw wire descriptor.
    ///
    /// A missing schema is tolerated (the backend means "no arguments") and
    /// normalised to an empty object schema; anything else that is not an
    /// object is rejected, as is an empty name.
    pub(crate) fn from_raw(index: usize, raw: RawToolDescriptor) -> Result<Self, BackendError> {
        if raw.name.is_empty() {
            return Err(BackendError::MalformedDescriptor {
                index,
                reason: "empty tool name".to_string(),
            });
        }
        let input_schema = match raw.input_schema {
            Value::Object(map) => Value::Object(map),
            Value::Null => serde_json::json!({ "type": "object" }),
            other => {
                return Err(BackendError::MalformedDescriptor {
                    index,
                    reason: format!("input schema must be an object, got {other}"),
                })
            }
        };
        Ok(Self {
            name: raw.name,
            description: raw.description,
            input_schema,
        })
    }
}

/// Result of a single backend tool call.
#[derive(Debug, Clone)]
pub struct CallResult {
    pub content: String,
    pub is_error: bool,
}

/// An opaque capability provider: one live session to an external
/// automation backend.
///
/// Lifecycle: `connect()` (idempotent) → zero or more `list_tools()` /
/// `call_tool()` → `close()` exactly once.  A connection is owned by one
/// agent invocation and never shared across concurrent invocations.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Establish the session.  Safe to call when already connected.
    async fn connect(&self) -> Result<(), BackendError>;

    /// Enumerate the tools currently available on this session.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, BackendError>;

    /// Invoke a tool by name on this session.
    async fn call_tool(&self, name: &str, args: Value) -> Result<CallResult, BackendError>;

    /// Tear the session down.  Idempotent; later calls are no-ops.
    async fn close(&self) -> Result<(), BackendError>;
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(name: &str, schema: Value) -> RawToolDescriptor {
        serde_json::from_value(json!({
            "name": name,
            "description": "a tool",
            "inputSchema": schema,
        }))
        .unwrap()
    }

    #[test]
    fn valid_descriptor_passes() {
        let desc = ToolDescriptor::from_raw(0, raw("click", json!({"type": "object"}))).unwrap();
        assert_eq!(desc.name, "click");
        assert!(desc.input_schema.is_object());
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = ToolDescriptor::from_raw(3, raw("", json!({"type": "object"}))).unwrap_err();
        match err {
            BackendError::MalformedDescriptor { index, reason } => {
                assert_eq!(index, 3);
                assert!(reason.contains("empty"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_schema_normalises_to_empty_object() {
        let desc = ToolDescriptor::from_raw(0, raw("snap", Value::Null)).unwrap();
        assert_eq!(desc.input_schema, json!({"type": "object"}));
    }

    #[test]
    fn non_object_schema_is_rejected() {
        let err = ToolDescriptor::from_raw(1, raw("bad", json!("string schema"))).unwrap_err();
        assert!(matches!(err, BackendError::MalformedDescriptor { index: 1, .. }));
    }
}
