#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ids;
pub mod ports;
pub mod stream;
pub mod tokens;
pub mod translate;
pub mod validation;

// Re-export commonly used types for convenience
pub use domain::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ContentBlock,
    InputMessage, MessageContent, MessagesRequest, MessagesResponse, OutputEvent, Role,
    StopReason, SystemPrompt, ToolChoice, ToolSpec,
};
pub use error::{GatewayError, ValidationError};
pub use ports::{BackendHealth, ByteStream, ChatBackend};
pub use stream::{LineBuffer, StreamReencoder, StreamState, ToolCallSlot};
pub use tokens::estimate_input_tokens;
pub use translate::{to_source_response, to_target_request};
pub use validation::{parse_request, validate_request};
