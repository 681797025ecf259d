//! Directory tools: listing and creation.

use ember_core::error::ToolError;
use serde_json::Value;

pub(crate) async fn list(args: &Value) -> Result<String, ToolError> {
    let path = args["path"].as_str().unwrap_or(".");

    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "list_dir".into(),
            reason: format!("failed to list {path}: {e}"),
        })?;

    let mut names = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let mut name = entry.file_name().to_string_lossy().to_string();
        if entry.path().is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    if names.is_empty() {
        Ok(format!("{path} is empty"))
    } else {
        Ok(names.join("\n"))
    }
}

pub(crate) async fn make(args: &Value) -> Result<String, ToolError> {
    let path = args["path"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing 'path'".into()))?;

    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "make_dir".into(),
            reason: format!("failed to create {path}: {e}"),
        })?;

    Ok(format!("Created directory {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_sorted_with_dir_markers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let output = list(&serde_json::json!({"path": dir.path().to_str().unwrap()}))
            .await
            .unwrap();
        assert_eq!(output, "a.txt\nb.txt\nsub/");
    }

    #[tokio::test]
    async fn list_missing_directory() {
        let err = list(&serde_json::json!({"path": "/tmp/ember_no_such_dir_5555"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }

    #[tokio::test]
    async fn make_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("c");

        let output = make(&serde_json::json!({"path": target.to_str().unwrap()}))
            .await
            .unwrap();
        assert!(output.starts_with("Created directory"));
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn make_requires_path() {
        let err = make(&serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
