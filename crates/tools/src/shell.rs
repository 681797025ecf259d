//! Shell command execution.
//!
//! Runs a command through the platform shell and formats stdout/stderr
//! for the model. Approval and allowlisting happen in the dispatcher
//! before this is reached.

use ember_core::error::ToolError;
use tokio::process::Command;
use tracing::{debug, warn};

pub(crate) async fn run(command: &str) -> Result<String, ToolError> {
    debug!(command = %command, "Executing shell command");

    let output = if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", command]).output().await
    } else {
        Command::new("sh").args(["-c", command]).output().await
    };

    let output = output.map_err(|e| ToolError::ExecutionFailed {
        tool_name: "shell".into(),
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
        warn!(command = %command, exit_code = code, "Command failed");
        format!("[exit code: {code}]\n{stdout}\n{stderr}")
    };

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        let output = run("echo hello").await.unwrap();
        assert_eq!(output, "hello");
    }

    #[tokio::test]
    async fn failed_command_reports_exit_code() {
        let output = run("exit 3").await.unwrap();
        assert!(output.contains("[exit code: 3]"));
    }

    #[tokio::test]
    async fn stderr_is_labelled() {
        let output = run("echo oops >&2").await.unwrap();
        assert!(output.contains("[stderr]: oops"));
    }
}
