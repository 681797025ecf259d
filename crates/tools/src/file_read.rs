//! File read tool.

use ember_core::error::ToolError;
use serde_json::Value;

pub(crate) async fn run(args: &Value) -> Result<String, ToolError> {
    let path = args["path"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing 'path'".into()))?;

    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: "file_read".into(),
            reason: format!("failed to read {path}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "Hello, world!").unwrap();

        let output = run(&serde_json::json!({"path": path.to_str().unwrap()}))
            .await
            .unwrap();
        assert_eq!(output, "Hello, world!");
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stable.txt");
        std::fs::write(&path, "unchanged content").unwrap();

        let args = serde_json::json!({"path": path.to_str().unwrap()});
        let first = run(&args).await.unwrap();
        let second = run(&args).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = run(&serde_json::json!({"path": "/tmp/ember_no_such_file_98765.txt"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }

    #[tokio::test]
    async fn missing_path_argument() {
        let err = run(&serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
