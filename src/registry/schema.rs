//! Tool catalog types.

use serde::{Deserialize, Serialize};

/// Metadata advertising one remotely invocable operation.
///
/// Immutable once fetched; lives for one client session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    /// JSON Schema for the tool's arguments.
    pub input_schema: serde_json::Value,
}
