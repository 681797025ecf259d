//! Exact-text replacement tool.
//!
//! Fails when the target substring is absent; on success replaces every
//! occurrence and reports the count.

use ember_core::error::ToolError;
use serde_json::Value;

pub(crate) async fn run(args: &Value) -> Result<String, ToolError> {
    let path = args["path"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing 'path'".into()))?;
    let old_text = args["old_text"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing 'old_text'".into()))?;
    let new_text = args["new_text"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing 'new_text'".into()))?;

    if old_text.is_empty() {
        return Err(ToolError::InvalidArguments("'old_text' must not be empty".into()));
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "edit".into(),
            reason: format!("failed to read {path}: {e}"),
        })?;

    let count = content.matches(old_text).count();
    if count == 0 {
        return Err(ToolError::ExecutionFailed {
            tool_name: "edit".into(),
            reason: format!("the exact text was not found in {path}"),
        });
    }

    let updated = content.replace(old_text, new_text);
    tokio::fs::write(path, updated)
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "edit".into(),
            reason: format!("failed to write {path}: {e}"),
        })?;

    Ok(format!("Replaced {count} occurrence(s) in {path}"))
}
