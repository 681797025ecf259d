//! The HTTP transport client.
//!
//! Sends a conversation plus tool schema to `{base_url}/chat/completions`
//! and returns one normalized assistant message, whether the endpoint
//! answered buffered or via incremental deltas. Owns retry/backoff and
//! the per-attempt watchdog timeout.

use std::time::Duration;

use async_trait::async_trait;
use ember_core::client::{ModelClient, SendOptions};
use ember_core::error::TransportError;
use ember_core::message::Message;
use ember_core::tool::ToolDefinition;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::stream::DeltaAssembler;
use crate::wire::{ApiMessage, ApiResponse, ApiToolDefinition};

/// Transport configuration, passed in at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    /// Optional bearer credential
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// Additional attempts beyond the first, for retryable failures only
    pub max_retries: u32,

    /// Watchdog bound per attempt
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            model: "gpt-4o".into(),
            max_retries: 3,
            timeout: Duration::from_millis(60_000),
        }
    }
}

/// An HTTP client for one chat-completions endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Delay before retry number `attempt`: 1s doubling per attempt,
    /// capped at 10s.
    fn backoff_delay(attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(1000u64.saturating_mul(factor).min(10_000))
    }

    fn build_body(&self, messages: &[Message], tools: &[ToolDefinition], stream: bool) -> serde_json::Value {
        let api_messages: Vec<ApiMessage> = messages.iter().map(ApiMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": api_messages,
            "stream": stream,
        });
        if !tools.is_empty() {
            let api_tools: Vec<ApiToolDefinition> =
                tools.iter().map(ApiToolDefinition::from_domain).collect();
            body["tools"] = serde_json::json!(api_tools);
        }
        body
    }

    async fn attempt(
        &self,
        body: &serde_json::Value,
        stream: bool,
        sink: &mut (dyn FnMut(&str) + Send),
    ) -> Result<Message, TransportError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut request = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Api { status, message });
        }

        if stream {
            self.read_stream(response, sink).await
        } else {
            let parsed: ApiResponse = response
                .json()
                .await
                .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
            let choice = parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| TransportError::InvalidResponse("no choices in response".into()))?;
            Ok(choice.message.into_assistant())
        }
    }

    async fn read_stream(
        &self,
        response: reqwest::Response,
        sink: &mut (dyn FnMut(&str) + Send),
    ) -> Result<Message, TransportError> {
        let mut assembler = DeltaAssembler::new();
        let mut bytes = response.bytes_stream();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|e| TransportError::Network(e.to_string()))?;
            for fragment in assembler.feed(&chunk) {
                sink(&fragment);
            }
            if assembler.is_done() {
                break;
            }
        }

        Ok(assembler.finish())
    }
}

#[async_trait]
impl ModelClient for ChatClient {
    async fn send(
        &self,
        messages: &[Message],
        mut options: SendOptions<'_>,
    ) -> Result<Message, TransportError> {
        let body = self.build_body(messages, options.tools, options.stream);
        debug!(
            model = %self.config.model,
            messages = messages.len(),
            stream = options.stream,
            "Sending completion request"
        );

        let mut attempt: u32 = 0;
        loop {
            let mut noop = |_: &str| {};
            let sink: &mut (dyn FnMut(&str) + Send) = match options.on_chunk.as_mut() {
                Some(cb) => &mut **cb,
                None => &mut noop,
            };

            let outcome = tokio::time::timeout(
                self.config.timeout,
                self.attempt(&body, options.stream, sink),
            )
            .await;

            let error = match outcome {
                Ok(Ok(message)) => return Ok(message),
                Ok(Err(e)) => e,
                Err(_) => TransportError::Timeout(format!(
                    "attempt exceeded {} ms",
                    self.config.timeout.as_millis()
                )),
            };

            if error.is_retryable() && attempt < self.config.max_retries {
                let delay = Self::backoff_delay(attempt);
                warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying completion request"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(error);
        }
    }
}
