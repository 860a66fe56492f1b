//! Inbound-protocol response types.

use serde::{Deserialize, Serialize};

use super::messages::ContentBlock;

/// Why generation stopped, in inbound-protocol terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
}

impl StopReason {
    /// Map a backend finish reason. Total: anything unrecognised, including
    /// `content_filter` and absence, is `EndTurn`.
    pub fn from_finish_reason(finish_reason: Option<&str>) -> Self {
        match finish_reason {
            Some("length") => Self::MaxTokens,
            Some("tool_calls") => Self::ToolUse,
            _ => Self::EndTurn,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EndTurn => "end_turn",
            Self::MaxTokens => "max_tokens",
            Self::ToolUse => "tool_use",
        }
    }
}

/// Token usage reported to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Non-streaming response body of `POST /v1/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    /// Always "message".
    pub r#type: String,
    /// Always "assistant".
    pub role: String,
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
    pub stop_sequence: Option<String>,
    pub usage: Usage,
}

impl MessagesResponse {
    pub fn new(
        id: String,
        model: impl Into<String>,
        content: Vec<ContentBlock>,
        stop_reason: StopReason,
        usage: Usage,
    ) -> Self {
        Self {
            id,
            r#type: "message".to_string(),
            role: "assistant".to_string(),
            model: model.into(),
            content,
            stop_reason,
            stop_sequence: None,
            usage,
        }
    }
}
