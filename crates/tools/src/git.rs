//! Version-control tools: a fixed set of git actions run as subprocesses.

use ember_core::error::ToolError;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

/// The supported git actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitAction {
    Status,
    Diff,
    Add,
    Commit,
    Stash,
}

impl GitAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status => "git_status",
            Self::Diff => "git_diff",
            Self::Add => "git_add",
            Self::Commit => "git_commit",
            Self::Stash => "git_stash",
        }
    }
}

pub(crate) async fn run(action: GitAction, args: &Value) -> Result<String, ToolError> {
    let mut git_args: Vec<String> = match action {
        GitAction::Status => vec!["status".into()],
        GitAction::Diff => {
            let mut v = vec!["diff".into()];
            if let Some(path) = args["path"].as_str() {
                v.push(path.into());
            }
            v
        }
        GitAction::Add => {
            let mut v = vec!["add".into()];
            match &args["paths"] {
                Value::Array(paths) => {
                    for p in paths {
                        if let Some(p) = p.as_str() {
                            v.push(p.into());
                        }
                    }
                }
                Value::String(path) => v.push(path.clone()),
                _ => {}
            }
            if v.len() == 1 {
                v.push(".".into());
            }
            v
        }
        GitAction::Commit => {
            let message = args["message"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("missing 'message'".into()))?;
            vec!["commit".into(), "-m".into(), message.into()]
        }
        GitAction::Stash => vec!["stash".into()],
    };

    if let Some(cwd) = args["cwd"].as_str() {
        git_args.splice(0..0, ["-C".to_string(), cwd.to_string()]);
    }

    debug!(action = action.name(), "Running git");

    let output = Command::new("git")
        .args(&git_args)
        .output()
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: action.name().into(),
            reason: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let text = if output.status.success() {
        if stderr.is_empty() {
            stdout
        } else {
            format!("{stdout}\n[stderr]: {stderr}")
        }
    } else {
        let code = output.status.code().unwrap_or(-1);
        format!("[exit code: {code}]\n{stdout}\n{stderr}")
    };

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let run = |args: &[&str]| {
            std::process::Command::new("git")
                .arg("-C")
                .arg(dir.path())
                .args(args)
                .output()
                .unwrap()
        };
        run(&["init"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "Test"]);
        dir
    }

    #[tokio::test]
    async fn status_in_fresh_repo() {
        let dir = init_repo();
        let output = run(
            GitAction::Status,
            &serde_json::json!({"cwd": dir.path().to_str().unwrap()}),
        )
        .await
        .unwrap();
        assert!(output.contains("No commits yet") || output.contains("branch"));
    }

    #[tokio::test]
    async fn add_and_commit() {
        let dir = init_repo();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let cwd = dir.path().to_str().unwrap();

        run(GitAction::Add, &serde_json::json!({"cwd": cwd}))
            .await
            .unwrap();
        let output = run(
            GitAction::Commit,
            &serde_json::json!({"cwd": cwd, "message": "add a.txt"}),
        )
        .await
        .unwrap();
        assert!(output.contains("add a.txt"));
    }

    #[tokio::test]
    async fn commit_requires_message() {
        let err = run(GitAction::Commit, &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn status_outside_a_repo_reports_failure_text() {
        let dir = tempfile::tempdir().unwrap();
        let output = run(
            GitAction::Status,
            &serde_json::json!({"cwd": dir.path().to_str().unwrap()}),
        )
        .await
        .unwrap();
        assert!(output.contains("exit code") || output.contains("not a git repository"));
    }
}
