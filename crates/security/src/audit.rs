//! Audit logging for tool calls.
//!
//! One record per dispatched call: tool name, arguments, result or error,
//! timestamp, and working directory. Sinks may fail; callers swallow sink
//! failures so auditing never blocks a turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A single audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub tool: String,
    pub args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub ts: DateTime<Utc>,
    pub cwd: PathBuf,
}

impl AuditRecord {
    fn base(tool: &str, args: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tool: tool.into(),
            args,
            result: None,
            error: None,
            ts: Utc::now(),
            cwd: std::env::current_dir().unwrap_or_default(),
        }
    }

    /// Record a successful call.
    pub fn success(tool: &str, args: serde_json::Value, result: impl Into<String>) -> Self {
        let mut record = Self::base(tool, args);
        record.result = Some(result.into());
        record
    }

    /// Record a failed call.
    pub fn failure(tool: &str, args: serde_json::Value, error: impl Into<String>) -> Self {
        let mut record = Self::base(tool, args);
        record.error = Some(error.into());
        record
    }
}

/// Error writing to an audit sink.
#[derive(Debug, thiserror::Error)]
#[error("Audit sink failure: {0}")]
pub struct AuditError(pub String);

/// Where audit records are written.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Logs records via `tracing::info!`.
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        tracing::info!(
            tool = %record.tool,
            args = %record.args,
            result = ?record.result,
            error = ?record.error,
            cwd = %record.cwd.display(),
            "AUDIT"
        );
        Ok(())
    }
}

/// Appends one JSON line per record to a file.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AuditSink for JsonlSink {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        use std::io::Write;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AuditError(e.to_string()))?;
        }
        let line = serde_json::to_string(record).map_err(|e| AuditError(e.to_string()))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AuditError(e.to_string()))?;
        writeln!(file, "{line}").map_err(|e| AuditError(e.to_string()))
    }
}

/// Collects records in memory, for tests.
#[derive(Default)]
pub struct MemorySink {
    entries: std::sync::Mutex<Vec<AuditRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditRecord> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl AuditSink for MemorySink {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.entries.lock().unwrap().push(record.clone());
        Ok(())
    }
}
