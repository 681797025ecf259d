//! The `ModelClient` trait, the seam between the orchestrator and the
//! transport layer.
//!
//! The orchestrator calls `send()` without knowing whether the endpoint
//! answered in one shot or via incremental deltas; either way it gets one
//! normalized assistant message back. Tests swap in scripted clients.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::message::Message;
use crate::tool::ToolDefinition;

/// Sink receiving partial text fragments during a streamed response.
pub type ChunkSink<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Per-call options for `ModelClient::send`.
pub struct SendOptions<'a> {
    /// Tool definitions offered to the model for this request.
    pub tools: &'a [ToolDefinition],

    /// Request incremental deltas from the endpoint.
    pub stream: bool,

    /// Where streamed text fragments go. Ignored when `stream` is false.
    pub on_chunk: Option<ChunkSink<'a>>,
}

impl<'a> SendOptions<'a> {
    /// A plain buffered request.
    pub fn buffered(tools: &'a [ToolDefinition]) -> Self {
        Self {
            tools,
            stream: false,
            on_chunk: None,
        }
    }

    /// A streamed request forwarding fragments to `on_chunk`.
    pub fn streamed(tools: &'a [ToolDefinition], on_chunk: ChunkSink<'a>) -> Self {
        Self {
            tools,
            stream: true,
            on_chunk: Some(on_chunk),
        }
    }
}

/// A client for one inference endpoint.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the conversation and tool schema; return the assistant's reply
    /// as one normalized message.
    async fn send(
        &self,
        messages: &[Message],
        options: SendOptions<'_>,
    ) -> Result<Message, TransportError>;
}
