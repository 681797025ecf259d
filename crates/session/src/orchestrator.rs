//! The conversation orchestrator.
//!
//! Owns the message history for one session and drives the turn loop:
//! send to the endpoint, inspect the reply, dispatch any tool calls
//! strictly sequentially in issuance order, feed results back, and
//! repeat until the model stops requesting tools or the step bound is
//! hit. One orchestrator owns exactly one conversation; nothing here is
//! shared across conversations.

use std::sync::Arc;

use ember_core::client::{ChunkSink, ModelClient, SendOptions};
use ember_core::error::Error;
use ember_core::message::{Message, Role};
use ember_core::tool::ToolDefinition;
use ember_tools::ToolDispatcher;
use tracing::{debug, warn};

/// Orchestrator configuration, passed in at construction.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum request/tool-execution steps per turn
    pub max_steps: u32,

    /// The system prompt installed as the first message
    pub system_prompt: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            system_prompt: "You are a coding assistant running in a terminal.".into(),
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered with text; the turn is complete.
    Completed(String),

    /// The step bound was exhausted while the model kept requesting
    /// tools. The already-dispatched tool results stay in history;
    /// nothing further was appended.
    StepLimitReached,
}

/// Per-turn options for `chat`.
pub struct ChatOptions<'a> {
    /// Request incremental deltas from the endpoint.
    pub stream: bool,

    /// Where streamed text fragments go, independent of whether the turn
    /// loop continues afterwards.
    pub on_chunk: Option<ChunkSink<'a>>,
}

impl<'a> ChatOptions<'a> {
    pub fn buffered() -> Self {
        Self {
            stream: false,
            on_chunk: None,
        }
    }

    pub fn streamed(on_chunk: ChunkSink<'a>) -> Self {
        Self {
            stream: true,
            on_chunk: Some(on_chunk),
        }
    }
}

/// Drives the turn loop for one conversation.
pub struct ConversationOrchestrator {
    client: Arc<dyn ModelClient>,
    dispatcher: Arc<ToolDispatcher>,
    tools: Vec<ToolDefinition>,
    history: Vec<Message>,
    max_steps: u32,
}

impl ConversationOrchestrator {
    /// Build an orchestrator. The tool schema is captured once here and
    /// stays fixed for the lifetime of the session.
    pub fn new(
        client: Arc<dyn ModelClient>,
        dispatcher: Arc<ToolDispatcher>,
        config: OrchestratorConfig,
    ) -> Self {
        let tools = dispatcher.definitions();
        Self {
            client,
            dispatcher,
            tools,
            history: vec![Message::system(&config.system_prompt)],
            max_steps: config.max_steps,
        }
    }

    /// Run one turn for `input`.
    ///
    /// A transport failure propagates out with history intact; because
    /// the user message stays appended, retrying the same input resubmits
    /// it without duplicating it.
    pub async fn chat(
        &mut self,
        input: &str,
        mut options: ChatOptions<'_>,
    ) -> Result<TurnOutcome, Error> {
        let retrying_same_input = matches!(
            self.history.last(),
            Some(last) if last.role == Role::User && last.text() == input
        );
        if !retrying_same_input {
            self.history.push(Message::user(input));
        }

        for step in 0..self.max_steps {
            debug!(step, messages = self.history.len(), "Turn loop step");

            let sink: Option<ChunkSink<'_>> = options.on_chunk.as_mut().map(|cb| &mut **cb);
            let send_options = SendOptions {
                tools: &self.tools,
                stream: options.stream,
                on_chunk: sink,
            };
            let reply = self.client.send(&self.history, send_options).await?;

            let content = reply.text().to_string();
            let tool_calls = reply.tool_calls.clone();
            self.history.push(reply);

            if tool_calls.is_empty() {
                return Ok(TurnOutcome::Completed(content));
            }

            // Strictly sequential, in issuance order; the next request is
            // not sent until every result is appended.
            for call in &tool_calls {
                let result = self.dispatcher.execute(call).await;
                self.history.push(Message::tool_result(
                    &result.tool_call_id,
                    &result.name,
                    &result.content,
                ));
            }
        }

        warn!(
            max_steps = self.max_steps,
            "Step bound reached while the model kept requesting tools"
        );
        Ok(TurnOutcome::StepLimitReached)
    }

    /// Append a message of arbitrary role, for context injection.
    pub fn push_message(&mut self, message: Message) {
        self.history.push(message);
    }

    /// Reset history to just the system message.
    pub fn clear(&mut self) {
        self.history.truncate(1);
    }

    /// The full message history.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Replace the full history, for session load.
    pub fn replace_history(&mut self, messages: Vec<Message>) {
        self.history = messages;
    }
}
