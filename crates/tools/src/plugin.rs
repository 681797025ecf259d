//! Dynamically registered plugin tools.
//!
//! The dispatcher resolves built-in names first and falls back to
//! plugins registered by exact name. Loading plugin modules from disk is
//! the caller's concern; only the interface lives here.

use async_trait::async_trait;
use ember_core::error::ToolError;
use ember_core::tool::ToolDefinition;

/// A tool supplied by a plugin.
#[async_trait]
pub trait PluginTool: Send + Sync {
    /// The schema entry advertised to the model.
    fn definition(&self) -> ToolDefinition;

    /// Execute with decoded arguments; the result is always text.
    async fn call(&self, args: serde_json::Value) -> Result<String, ToolError>;
}
