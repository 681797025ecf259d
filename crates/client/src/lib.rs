//! Chat-completions transport for ember.
//!
//! `ChatClient` implements `ember_core::ModelClient` against any
//! OpenAI-compatible `/chat/completions` endpoint, buffered or streamed.

pub mod chat;
mod stream;
mod wire;

pub use chat::{ChatClient, ClientConfig};
