//! File write tool. Creates parent directories as needed.

use ember_core::error::ToolError;
use serde_json::Value;

pub(crate) async fn run(args: &Value) -> Result<String, ToolError> {
    let path = args["path"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing 'path'".into()))?;
    let content = args["content"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing 'content'".into()))?;

    if let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        return Err(ToolError::ExecutionFailed {
            tool_name: "file_write".into(),
            reason: format!("failed to create parent directory: {e}"),
        });
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "file_write".into(),
            reason: format!("failed to write {path}: {e}"),
        })?;

    Ok(format!("Wrote {} bytes to {path}", content.len()))
}
