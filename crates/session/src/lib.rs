//! Conversation orchestration and session persistence for ember.
//!
//! The turn loop lives here:
//!
//! 1. Append the user message
//! 2. Send the conversation and tool schema to the endpoint
//! 3. If the reply carries tool calls, dispatch them sequentially and
//!    append one tool result per call
//! 4. Loop until the model answers with text or the step bound is hit

pub mod orchestrator;
pub mod store;

pub use orchestrator::{ChatOptions, ConversationOrchestrator, OrchestratorConfig, TurnOutcome};
pub use store::SessionStore;
