//! The tool dispatcher.
//!
//! Takes one tool call, validates arguments, applies the approval policy
//! for side-effecting actions, executes the effect, and returns a tool
//! result. Never errors across its public boundary: every failure is
//! encoded as descriptive text so the model can see it and react within
//! the same turn.

use std::collections::BTreeMap;
use std::sync::Arc;

use ember_core::error::ToolError;
use ember_core::message::ToolCall;
use ember_core::tool::{ToolDefinition, ToolResult};
use ember_security::allowlist::{CommandAllowlist, CommandCheck};
use ember_security::approval::ApprovalProvider;
use ember_security::audit::{AuditRecord, AuditSink};
use serde_json::Value;
use tracing::{debug, warn};

use crate::builtin::{self, BuiltinTool};
use crate::plugin::PluginTool;
use crate::{dir, edit, file_read, file_write, git, search, shell};

/// Dispatch configuration, passed in at construction.
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Report every call without executing anything
    pub dry_run: bool,

    /// Run shell commands without prompting (subject to the allowlist)
    pub auto_approve: bool,

    /// Shell base commands permitted under auto-approve.
    /// Empty means no allowlist is configured.
    pub allowlist: Vec<String>,
}

/// Validates, gates, executes, and audits tool calls.
pub struct ToolDispatcher {
    dry_run: bool,
    auto_approve: bool,
    allowlist: CommandAllowlist,
    approval: Arc<dyn ApprovalProvider>,
    audit: Option<Arc<dyn AuditSink>>,
    plugins: BTreeMap<String, Arc<dyn PluginTool>>,
}

impl ToolDispatcher {
    pub fn new(config: DispatcherConfig, approval: Arc<dyn ApprovalProvider>) -> Self {
        Self {
            dry_run: config.dry_run,
            auto_approve: config.auto_approve,
            allowlist: CommandAllowlist::new(config.allowlist),
            approval,
            audit: None,
            plugins: BTreeMap::new(),
        }
    }

    /// Attach an audit sink. Sink failures are swallowed at dispatch time.
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Register a plugin tool under its advertised name. Replaces any
    /// existing plugin with the same name.
    pub fn register_plugin(&mut self, plugin: Arc<dyn PluginTool>) {
        let name = plugin.definition().name;
        self.plugins.insert(name, plugin);
    }

    /// All schema entries: built-ins first, then plugins by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs = builtin::definitions();
        defs.extend(self.plugins.values().map(|p| p.definition()));
        defs
    }

    /// Execute one tool call. Guaranteed not to error; failures come back
    /// as descriptive result text.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let args: Value = match serde_json::from_str(&call.arguments) {
            Ok(v) => v,
            Err(e) => {
                let text = format!("Invalid tool arguments: {e}");
                self.record(call, &Value::Null, Err(&text));
                return Self::result(call, text);
            }
        };

        if self.dry_run {
            let text = format!("[dry-run] would execute {} with arguments {args}", call.name);
            self.record(call, &args, Ok(&text));
            return Self::result(call, text);
        }

        debug!(tool = %call.name, id = %call.id, "Dispatching tool call");

        match self.run(call, &args).await {
            Ok(text) => {
                self.record(call, &args, Ok(&text));
                Self::result(call, text)
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                let text = format!("Error: {e}");
                self.record(call, &args, Err(&text));
                Self::result(call, text)
            }
        }
    }

    async fn run(&self, call: &ToolCall, args: &Value) -> Result<String, ToolError> {
        match BuiltinTool::resolve(&call.name) {
            Some(BuiltinTool::FileWrite) => file_write::run(args).await,
            Some(BuiltinTool::FileRead) => file_read::run(args).await,
            Some(BuiltinTool::ListDir) => dir::list(args).await,
            Some(BuiltinTool::MakeDir) => dir::make(args).await,
            Some(BuiltinTool::Search) => search::run(args).await,
            Some(BuiltinTool::Edit) => edit::run(args).await,
            Some(BuiltinTool::Shell) => self.run_shell(args).await,
            Some(BuiltinTool::Git(action)) => git::run(action, args).await,
            None => match self.plugins.get(&call.name) {
                Some(plugin) => plugin.call(args.clone()).await,
                None => Err(ToolError::NotFound(call.name.clone())),
            },
        }
    }

    /// The shell approval gate. Dry-run is already handled above; here the
    /// command is either auto-approved (optionally through the allowlist)
    /// or put to the approval provider.
    async fn run_shell(&self, args: &Value) -> Result<String, ToolError> {
        let command = args["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'command'".into()))?;

        if self.auto_approve {
            if self.allowlist.is_empty() {
                return shell::run(command).await;
            }
            return match self.allowlist.check(command) {
                CommandCheck::Allowed => shell::run(command).await,
                CommandCheck::Denied { reason, .. } => Err(ToolError::PermissionDenied {
                    tool_name: "shell".into(),
                    reason,
                }),
            };
        }

        if self.approval.confirm(command) {
            shell::run(command).await
        } else {
            Err(ToolError::PermissionDenied {
                tool_name: "shell".into(),
                reason: "command rejected at the approval prompt".into(),
            })
        }
    }

    fn result(call: &ToolCall, content: String) -> ToolResult {
        ToolResult {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            content,
        }
    }

    fn record(&self, call: &ToolCall, args: &Value, outcome: Result<&str, &str>) {
        let Some(sink) = &self.audit else { return };
        let record = match outcome {
            Ok(result) => AuditRecord::success(&call.name, args.clone(), result),
            Err(error) => AuditRecord::failure(&call.name, args.clone(), error),
        };
        if let Err(e) = sink.record(&record) {
            warn!(error = %e, "Audit sink failure ignored");
        }
    }
}
