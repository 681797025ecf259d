//! Approval policies, shell allowlists, and audit logging for ember.
//!
//! Nothing in this crate executes anything. It decides whether a command
//! may run (allowlist + approval providers) and records what the
//! dispatcher did (audit records + sinks).

pub mod allowlist;
pub mod approval;
pub mod audit;

pub use allowlist::{CommandAllowlist, CommandCheck};
pub use approval::{ApprovalProvider, InteractivePrompt, StaticPolicy};
pub use audit::{AuditError, AuditRecord, AuditSink, JsonlSink, MemorySink, TracingSink};
