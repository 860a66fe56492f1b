//! The streaming state machine.
//!
//! Event order for every stream the reencoder produces:
//!
//! ```text
//! message_start
//! content_block_start(0, text)
//! ping
//! (content_block_delta | content_block_start | content_block_stop)*
//! message_delta
//! message_stop
//! ```
//!
//! Text always lives in block 0. Tool calls get blocks 1, 2, ... in the order
//! the backend first mentions them, whatever index the backend itself uses.
//! Once a tool call appears the text block is closed for good.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::{
    BlockStart, ChatCompletionChunk, ChatUsage, DeltaUsage, MessageDeltaBody, MessageStartBody,
    OutputEvent, StopReason, ToolCallDelta,
};
use crate::ids;

/// Backend end-of-stream sentinel.
const DONE_SENTINEL: &str = "[DONE]";

/// Output block index of the implicit text block.
const TEXT_BLOCK_INDEX: usize = 0;

/// One tool call seen on the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallSlot {
    /// Index the backend uses for this call.
    pub backend_index: u32,
    /// Output block index assigned at first appearance.
    pub block_index: usize,
    pub id: String,
    pub name: String,
    /// Argument fragments concatenated in arrival order.
    pub arguments: String,
}

impl ToolCallSlot {
    /// The accumulated arguments as JSON, if they parse. No arguments at all
    /// counts as an empty object.
    pub fn parsed_arguments(&self) -> Option<Value> {
        if self.arguments.is_empty() {
            return Some(json!({}));
        }
        serde_json::from_str(&self.arguments).ok()
    }
}

/// Per-request mutable state of a stream.
#[derive(Debug, Clone)]
pub struct StreamState {
    pub message_id: String,
    /// Model name reported to the client.
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub text_block_open: bool,
    /// Tool calls in order of first appearance.
    pub tool_calls: Vec<ToolCallSlot>,
    /// Set once the stream has terminated.
    pub stop_reason: Option<StopReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Streaming,
    Finished,
}

/// Reencodes backend chat-completion chunks into inbound-protocol events.
///
/// Every method returns the events to emit, in order. After the stream has
/// terminated (finish reason or [`finish_eof`](Self::finish_eof)) all input is
/// ignored and nothing more is produced.
#[derive(Debug)]
pub struct StreamReencoder {
    state: StreamState,
    phase: Phase,
}

impl StreamReencoder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            state: StreamState {
                message_id: ids::message_id(),
                model: model.into(),
                input_tokens: 0,
                output_tokens: 0,
                text_block_open: false,
                tool_calls: Vec::new(),
                stop_reason: None,
            },
            phase: Phase::Pending,
        }
    }

    pub const fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Opening events. Only the first call produces anything.
    pub fn start(&mut self) -> Vec<OutputEvent> {
        if self.phase != Phase::Pending {
            return Vec::new();
        }
        self.phase = Phase::Streaming;
        self.state.text_block_open = true;

        vec![
            OutputEvent::MessageStart {
                message: MessageStartBody::new(&self.state.message_id, &self.state.model),
            },
            OutputEvent::ContentBlockStart {
                index: TEXT_BLOCK_INDEX,
                content_block: BlockStart::Text {
                    text: String::new(),
                },
            },
            OutputEvent::Ping,
        ]
    }

    /// Handle one line of the backend's event stream.
    ///
    /// Blank lines, comments, non-data fields and the done sentinel produce
    /// nothing. A data line that is not a valid chunk is logged and skipped.
    pub fn process_line(&mut self, line: &str) -> Vec<OutputEvent> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(':') {
            return Vec::new();
        }
        let Some(data) = line.strip_prefix("data:").map(str::trim_start) else {
            return Vec::new();
        };
        if data == DONE_SENTINEL {
            return Vec::new();
        }

        match serde_json::from_str::<ChatCompletionChunk>(data) {
            Ok(chunk) => self.process_chunk(&chunk),
            Err(e) => {
                warn!(
                    message_id = %self.state.message_id,
                    error = %e,
                    line = %truncate(data, 200),
                    "Skipping unparseable stream chunk"
                );
                Vec::new()
            }
        }
    }

    /// Handle one parsed backend chunk.
    pub fn process_chunk(&mut self, chunk: &ChatCompletionChunk) -> Vec<OutputEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        let mut events = self.start();

        if let Some(usage) = &chunk.usage {
            self.record_usage(usage);
        }

        let Some(choice) = chunk.choices.as_deref().and_then(<[_]>::first) else {
            return events;
        };

        if let Some(delta) = &choice.delta {
            if let Some(text) = delta.content.as_deref()
                && !text.is_empty()
            {
                if self.state.text_block_open {
                    events.push(OutputEvent::text_delta(TEXT_BLOCK_INDEX, text));
                } else {
                    debug!(
                        message_id = %self.state.message_id,
                        "Dropping text that arrived after tool calls"
                    );
                }
            }

            if let Some(calls) = delta.tool_calls.as_deref()
                && !calls.is_empty()
            {
                self.close_text_block(&mut events);
                for call in calls {
                    self.apply_tool_call(call, &mut events);
                }
            }
        }

        if let Some(reason) = choice.finish_reason.as_deref()
            && !reason.is_empty()
        {
            self.finish(StopReason::from_finish_reason(Some(reason)), &mut events);
        }

        events
    }

    /// The backend closed the stream without a finish reason. Terminates
    /// normally with `end_turn`.
    ///
    /// Open tool blocks are closed here too, not only the text block, so every
    /// `content_block_start` the client saw is matched by a stop.
    pub fn finish_eof(&mut self) -> Vec<OutputEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        let mut events = self.start();

        warn!(
            message_id = %self.state.message_id,
            output_tokens = self.state.output_tokens,
            tool_calls = self.state.tool_calls.len(),
            "Backend stream ended without a finish reason"
        );

        self.finish(StopReason::EndTurn, &mut events);
        events
    }

    /// Usage counters are sticky: a zero never overwrites a known value.
    fn record_usage(&mut self, usage: &ChatUsage) {
        if let Some(prompt) = usage.prompt_tokens
            && prompt > 0
        {
            self.state.input_tokens = prompt;
        }
        if let Some(completion) = usage.completion_tokens
            && completion > 0
        {
            self.state.output_tokens = completion;
        }
    }

    fn apply_tool_call(&mut self, call: &ToolCallDelta, events: &mut Vec<OutputEvent>) {
        let backend_index = call.index.unwrap_or(0);
        let name = call
            .function
            .as_ref()
            .and_then(|f| f.name.as_deref())
            .filter(|name| !name.is_empty());
        let fragment = call
            .function
            .as_ref()
            .and_then(|f| f.arguments.as_deref())
            .filter(|args| !args.is_empty());

        let position = match self
            .state
            .tool_calls
            .iter()
            .position(|slot| slot.backend_index == backend_index)
        {
            Some(position) => {
                let slot = &mut self.state.tool_calls[position];
                if slot.name.is_empty()
                    && let Some(name) = name
                {
                    slot.name = name.to_string();
                }
                position
            }
            None => {
                let slot = ToolCallSlot {
                    backend_index,
                    block_index: self.state.tool_calls.len() + 1,
                    id: call
                        .id
                        .clone()
                        .filter(|id| !id.is_empty())
                        .unwrap_or_else(|| ids::tool_call_id(backend_index)),
                    name: name.unwrap_or_default().to_string(),
                    arguments: String::new(),
                };
                events.push(OutputEvent::ContentBlockStart {
                    index: slot.block_index,
                    content_block: BlockStart::ToolUse {
                        id: slot.id.clone(),
                        name: slot.name.clone(),
                        input: json!({}),
                    },
                });
                self.state.tool_calls.push(slot);
                self.state.tool_calls.len() - 1
            }
        };

        if let Some(fragment) = fragment {
            let slot = &mut self.state.tool_calls[position];
            slot.arguments.push_str(fragment);
            events.push(OutputEvent::input_json_delta(slot.block_index, fragment));
        }
    }

    fn close_text_block(&mut self, events: &mut Vec<OutputEvent>) {
        if self.state.text_block_open {
            self.state.text_block_open = false;
            events.push(OutputEvent::ContentBlockStop {
                index: TEXT_BLOCK_INDEX,
            });
        }
    }

    fn finish(&mut self, stop_reason: StopReason, events: &mut Vec<OutputEvent>) {
        self.close_text_block(events);
        events.extend(
            self.state
                .tool_calls
                .iter()
                .map(|slot| OutputEvent::ContentBlockStop {
                    index: slot.block_index,
                }),
        );
        events.push(OutputEvent::MessageDelta {
            delta: MessageDeltaBody {
                stop_reason,
                stop_sequence: None,
            },
            usage: DeltaUsage {
                output_tokens: self.state.output_tokens,
            },
        });
        events.push(OutputEvent::MessageStop);

        self.state.stop_reason = Some(stop_reason);
        self.phase = Phase::Finished;
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
