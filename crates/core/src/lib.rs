//! # ember core
//!
//! Domain types, traits, and error definitions for the ember coding
//! assistant. This crate defines the model that all other crates
//! implement against: messages, tool schemas, the `ModelClient` seam,
//! and the error hierarchy.

pub mod client;
pub mod error;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use client::{ChunkSink, ModelClient, SendOptions};
pub use error::{Error, Result, SessionError, ToolError, TransportError};
pub use message::{Message, Role, ToolCall};
pub use tool::{ToolDefinition, ToolResult};
