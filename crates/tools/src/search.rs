//! Text search tool.
//!
//! Walks a directory recursively, skipping hidden entries and common
//! build directories, and applies a regular expression per line. Output
//! is one `path:line: text` entry per match, capped at a fixed limit.
//! Unreadable and binary files are skipped silently.

use std::collections::VecDeque;
use std::path::PathBuf;

use ember_core::error::ToolError;
use regex::Regex;
use serde_json::Value;

const MAX_MATCHES: usize = 50;

const SKIP_DIRS: &[&str] = &[
    "target",
    "node_modules",
    "dist",
    "build",
    "out",
    "vendor",
    "__pycache__",
];

pub(crate) async fn run(args: &Value) -> Result<String, ToolError> {
    let root = args["path"].as_str().unwrap_or(".");
    let pattern = args["pattern"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing 'pattern'".into()))?;
    let re = Regex::new(pattern)
        .map_err(|e| ToolError::InvalidArguments(format!("invalid pattern: {e}")))?;

    let mut matches = Vec::new();
    let mut capped = false;
    let mut pending: VecDeque<PathBuf> = VecDeque::from([PathBuf::from(root)]);

    'walk: while let Some(dir) = pending.pop_front() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                if !SKIP_DIRS.contains(&name.as_str()) {
                    subdirs.push(path);
                }
            } else {
                files.push(path);
            }
        }
        files.sort();
        subdirs.sort();

        for file in files {
            let Ok(content) = tokio::fs::read_to_string(&file).await else {
                continue;
            };
            for (idx, line) in content.lines().enumerate() {
                if re.is_match(line) {
                    matches.push(format!("{}:{}: {}", file.display(), idx + 1, line));
                    if matches.len() >= MAX_MATCHES {
                        capped = true;
                        break 'walk;
                    }
                }
            }
        }
        pending.extend(subdirs);
    }

    if matches.is_empty() {
        return Ok(format!("No matches for '{pattern}' under {root}"));
    }

    let mut output = matches.join("\n");
    if capped {
        output.push_str(&format!("\n(stopped at {MAX_MATCHES} matches)"));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &std::path::Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn matches_report_path_line_and_text() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.rs", "fn main() {\n    let x = 1;\n}\n");

        let output = run(&serde_json::json!({
            "path": dir.path().to_str().unwrap(),
            "pattern": "let x"
        }))
        .await
        .unwrap();

        assert!(output.contains("a.rs:2:     let x = 1;"));
    }

    #[tokio::test]
    async fn hidden_and_build_dirs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/keep.rs", "needle\n");
        write(dir.path(), ".git/skip.rs", "needle\n");
        write(dir.path(), "target/skip.rs", "needle\n");
        write(dir.path(), "node_modules/skip.js", "needle\n");

        let output = run(&serde_json::json!({
            "path": dir.path().to_str().unwrap(),
            "pattern": "needle"
        }))
        .await
        .unwrap();

        assert!(output.contains("keep.rs"));
        assert!(!output.contains("skip"));
    }

    #[tokio::test]
    async fn binary_files_are_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();
        write(dir.path(), "ok.txt", "needle\n");

        let output = run(&serde_json::json!({
            "path": dir.path().to_str().unwrap(),
            "pattern": "needle"
        }))
        .await
        .unwrap();
        assert!(output.contains("ok.txt"));
    }

    #[tokio::test]
    async fn match_count_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let content = "needle\n".repeat(80);
        write(dir.path(), "many.txt", &content);

        let output = run(&serde_json::json!({
            "path": dir.path().to_str().unwrap(),
            "pattern": "needle"
        }))
        .await
        .unwrap();

        let match_lines = output.lines().filter(|l| l.contains("many.txt")).count();
        assert_eq!(match_lines, MAX_MATCHES);
        assert!(output.contains("stopped at 50 matches"));
    }

    #[tokio::test]
    async fn no_matches_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", "nothing here\n");

        let output = run(&serde_json::json!({
            "path": dir.path().to_str().unwrap(),
            "pattern": "absent_pattern"
        }))
        .await
        .unwrap();
        assert!(output.starts_with("No matches"));
    }

    #[tokio::test]
    async fn invalid_pattern_is_an_argument_error() {
        let err = run(&serde_json::json!({"path": ".", "pattern": "("}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
