//! Tool schema and result types.
//!
//! A `ToolDefinition` describes a capability to the model; a `ToolResult`
//! is the dispatcher's string outcome for one call. Results are always
//! text, even for failures: the model sees the error and can react to it
//! within the same turn.

use serde::{Deserialize, Serialize};

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The outcome of one tool call, matched back to the call by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub tool_call_id: String,

    /// Name of the tool that produced this result
    pub name: String,

    /// The output content. Errors are encoded as descriptive text.
    pub content: String,
}
