//! Streaming delta reassembly.
//!
//! The endpoint sends `data: {...}` lines terminated by `data: [DONE]`.
//! Payloads can arrive split at arbitrary byte boundaries, so incoming
//! bytes are buffered and consumed line by line, keeping the incomplete
//! trailing fragment for the next chunk. Content deltas are forwarded to
//! the caller immediately and accumulated; tool-call deltas accumulate
//! per positional index, concatenating argument fragments. Once an id has
//! been observed for an entry, later deltas carrying that id route by id
//! even if the provider moved them to a different index.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use ember_core::message::{Message, Role, ToolCall};
use tracing::trace;
use uuid::Uuid;

use crate::wire::StreamResponse;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Default)]
struct CallAccumulator {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Reassembles one assistant message from a stream of delta payloads.
#[derive(Debug, Default)]
pub(crate) struct DeltaAssembler {
    buffer: String,
    content: String,
    saw_content: bool,
    calls: BTreeMap<u32, CallAccumulator>,
    // id -> index of the accumulator that first carried it
    known_ids: HashMap<String, u32>,
    done: bool,
}

impl DeltaAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns the content fragments that became complete,
    /// in arrival order, for immediate forwarding to the chunk sink.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));

        let mut fragments = Vec::new();
        while let Some(line_end) = self.buffer.find('\n') {
            let line = self.buffer[..line_end].trim_end_matches('\r').to_string();
            self.buffer.drain(..=line_end);
            self.feed_line(&line, &mut fragments);
            if self.done {
                break;
            }
        }
        fragments
    }

    fn feed_line(&mut self, line: &str, fragments: &mut Vec<String>) {
        // Skip blank separators and SSE comments
        if line.is_empty() || line.starts_with(':') {
            return;
        }

        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };
        let data = data.trim();

        if data == DONE_MARKER {
            self.done = true;
            return;
        }

        let payload: StreamResponse = match serde_json::from_str(data) {
            Ok(p) => p,
            Err(e) => {
                // Malformed lines never abort the stream
                trace!(data = %data, error = %e, "Skipping unparseable stream payload");
                return;
            }
        };

        let Some(choice) = payload.choices.into_iter().next() else {
            return;
        };

        if let Some(content) = choice.delta.content
            && !content.is_empty()
        {
            self.saw_content = true;
            self.content.push_str(&content);
            fragments.push(content);
        }

        for delta in choice.delta.tool_calls.unwrap_or_default() {
            // Route by id when this id already has an accumulator;
            // otherwise by the delta's positional index.
            let key = delta
                .id
                .as_ref()
                .and_then(|id| self.known_ids.get(id).copied())
                .unwrap_or(delta.index);

            let acc = self.calls.entry(key).or_default();
            if acc.id.is_none()
                && let Some(id) = delta.id
            {
                self.known_ids.insert(id.clone(), key);
                acc.id = Some(id);
            }
            if let Some(function) = delta.function {
                if let Some(name) = function.name {
                    acc.name = Some(name);
                }
                if let Some(arguments) = function.arguments {
                    acc.arguments.push_str(&arguments);
                }
            }
        }
    }

    /// True once the terminal marker has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Emit the reassembled assistant message. Tool calls come out in
    /// index order, with the function name defaulting to `"unknown"` when
    /// it was never supplied.
    pub fn finish(self) -> Message {
        let content = if self.saw_content {
            Some(self.content)
        } else {
            None
        };

        let tool_calls: Vec<ToolCall> = self
            .calls
            .into_values()
            .map(|acc| ToolCall {
                id: acc.id.unwrap_or_default(),
                name: acc.name.unwrap_or_else(|| "unknown".into()),
                arguments: acc.arguments,
            })
            .collect();

        Message {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
            name: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(assembler: &mut DeltaAssembler, text: &str) -> Vec<String> {
        assembler.feed(text.as_bytes())
    }

    #[test]
    fn content_deltas_forward_and_accumulate() {
        let mut assembler = DeltaAssembler::new();
        let mut fragments = Vec::new();
        fragments.extend(feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n",
        ));
        fragments.extend(feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\ndata: [DONE]\n",
        ));

        assert_eq!(fragments, vec!["Hello", " world"]);
        assert!(assembler.is_done());
        let message = assembler.finish();
        assert_eq!(message.content.as_deref(), Some("Hello world"));
        assert!(message.tool_calls.is_empty());
    }

    #[test]
    fn bytes_split_mid_line_are_buffered() {
        let mut assembler = DeltaAssembler::new();
        let full = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n";
        let (a, b) = full.split_at(17);

        assert!(assembler.feed(a.as_bytes()).is_empty());
        let fragments = assembler.feed(b.as_bytes());
        assert_eq!(fragments, vec!["Hi"]);
    }

    #[test]
    fn tool_call_arguments_concatenate_across_deltas() {
        let mut assembler = DeltaAssembler::new();
        feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_a\",\"function\":{\"name\":\"edit\",\"arguments\":\"{\\\"path\\\"\"}}]}}]}\n",
        );
        feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\":\\\"a.rs\\\"}\"}}]}}]}\n",
        );
        feed_all(&mut assembler, "data: [DONE]\n");

        let message = assembler.finish();
        assert!(message.content.is_none());
        assert_eq!(message.tool_calls.len(), 1);
        let call = &message.tool_calls[0];
        assert_eq!(call.id, "call_a");
        assert_eq!(call.name, "edit");
        assert_eq!(call.arguments, "{\"path\":\"a.rs\"}");
    }

    #[test]
    fn multiple_indices_emit_in_index_order() {
        let mut assembler = DeltaAssembler::new();
        feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":1,\"id\":\"call_b\",\"function\":{\"name\":\"shell\",\"arguments\":\"{}\"}}]}}]}\n",
        );
        feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_a\",\"function\":{\"name\":\"file_read\",\"arguments\":\"{}\"}}]}}]}\n",
        );
        feed_all(&mut assembler, "data: [DONE]\n");

        let message = assembler.finish();
        let names: Vec<_> = message.tool_calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["file_read", "shell"]);
    }

    #[test]
    fn deltas_route_by_id_when_index_shifts() {
        let mut assembler = DeltaAssembler::new();
        feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_a\",\"function\":{\"name\":\"edit\",\"arguments\":\"{\\\"x\\\"\"}}]}}]}\n",
        );
        // Same id shows up under a different index; the fragment must land
        // on the original accumulator.
        feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":3,\"id\":\"call_a\",\"function\":{\"arguments\":\":1}\"}}]}}]}\n",
        );
        feed_all(&mut assembler, "data: [DONE]\n");

        let message = assembler.finish();
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].arguments, "{\"x\":1}");
    }

    #[test]
    fn missing_name_defaults_to_unknown() {
        let mut assembler = DeltaAssembler::new();
        feed_all(
            &mut assembler,
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_a\",\"function\":{\"arguments\":\"{}\"}}]}}]}\n",
        );
        feed_all(&mut assembler, "data: [DONE]\n");

        let message = assembler.finish();
        assert_eq!(message.tool_calls[0].name, "unknown");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut assembler = DeltaAssembler::new();
        let fragments = feed_all(
            &mut assembler,
            "data: {not json at all\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\ndata: [DONE]\n",
        );
        assert_eq!(fragments, vec!["ok"]);
        assert!(assembler.is_done());
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let mut assembler = DeltaAssembler::new();
        let fragments = feed_all(
            &mut assembler,
            ": keepalive\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n",
        );
        assert_eq!(fragments, vec!["x"]);
    }

    #[test]
    fn no_content_yields_none() {
        let mut assembler = DeltaAssembler::new();
        feed_all(&mut assembler, "data: [DONE]\n");
        let message = assembler.finish();
        assert!(message.content.is_none());
        assert!(message.tool_calls.is_empty());
    }
}
