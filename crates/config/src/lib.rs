//! Configuration loading and validation for ember.
//!
//! Loads configuration from `~/.ember/config.toml` with environment
//! variable overrides (`EMBER_API_KEY`, `EMBER_BASE_URL`, `EMBER_MODEL`).
//! All values are passed explicitly into the components that need them;
//! there is no process-wide configuration singleton.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The root configuration structure.
///
/// Maps directly to `~/.ember/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the inference endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the inference endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Transport settings
    #[serde(default)]
    pub client: ClientSettings,

    /// Turn-loop settings
    #[serde(default)]
    pub session: SessionSettings,

    /// Tool dispatch settings
    #[serde(default)]
    pub tools: ToolSettings,
}

/// Transport client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Additional attempts after the first request fails retryably
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Watchdog timeout per attempt, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Conversation orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Maximum request/tool-execution steps per turn
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// The system prompt installed at the head of every conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

/// Tool dispatch settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Report every tool call without executing anything
    #[serde(default)]
    pub dry_run: bool,

    /// Skip the interactive approval prompt for shell commands
    #[serde(default)]
    pub auto_approve: bool,

    /// Shell base commands allowed to run when `auto_approve` is set.
    /// Empty means no allowlist is configured.
    #[serde(default)]
    pub allowlist: Vec<String>,

    /// Append one JSON line per tool call to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout_ms() -> u64 {
    60_000
}
fn default_max_steps() -> u32 {
    10
}
fn default_system_prompt() -> String {
    "You are ember, a coding assistant running in a terminal. You can read \
     and edit files, search the workspace, run shell commands, and use git. \
     Prefer small, verifiable steps and report what you changed."
        .into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            client: ClientSettings::default(),
            session: SessionSettings::default(),
            tools: ToolSettings::default(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("client", &self.client)
            .field("session", &self.session)
            .field("tools", &self.tools)
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl AppConfig {
    /// The default configuration directory: `~/.ember`.
    pub fn config_dir() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".ember")
    }

    /// The default configuration file path: `~/.ember/config.toml`.
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from the default location, falling back to
    /// defaults when the file does not exist. Environment overrides are
    /// applied last.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path. A missing file yields the
    /// defaults; a present-but-invalid file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `EMBER_*` environment overrides, with `OPENAI_API_KEY` as a
    /// fallback for the key.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("EMBER_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none()
            && let Ok(key) = std::env::var("OPENAI_API_KEY")
        {
            self.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("EMBER_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(model) = std::env::var("EMBER_MODEL") {
            self.model = model;
        }
    }
}
