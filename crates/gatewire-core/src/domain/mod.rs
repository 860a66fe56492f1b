//! Wire-level domain types.
//!
//! - [`messages`]: the inbound (message-API) request shape.
//! - [`chat`]: the backend chat-completion request, response and stream chunk shapes.
//! - [`response`]: the inbound-protocol response and its stop reasons.
//! - [`events`]: the inbound-protocol stream events produced by the reencoder.

pub mod chat;
pub mod events;
pub mod messages;
pub mod response;

pub use chat::{
    AssistantMessage, ChatChoice, ChatCompletionChunk, ChatCompletionRequest,
    ChatCompletionResponse, ChatContent, ChatDelta, ChatMessage, ChatUsage, ChunkChoice,
    ContentPart, FunctionDefinition, FunctionName, ImageUrl, NamedToolChoice, StreamOptions,
    ToolCall, ToolCallDelta, ToolCallFunction, ToolCallFunctionDelta, ToolChoiceParam,
    ToolDefinition,
};
pub use events::{BlockDelta, BlockStart, DeltaUsage, MessageDeltaBody, MessageStartBody, OutputEvent, StartUsage};
pub use messages::{
    ContentBlock, ImageSource, InputMessage, MessageContent, MessagesRequest, Role, SystemPrompt,
    ToolChoice, ToolChoiceDirective, ToolSpec,
};
pub use response::{MessagesResponse, StopReason, Usage};
