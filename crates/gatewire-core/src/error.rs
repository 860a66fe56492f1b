//! Error taxonomy shared by every gatewire crate.
//!
//! Adapters map these variants to transport-specific responses; the core
//! only decides *what* went wrong, never how it is reported.

use std::time::Duration;

use thiserror::Error;

/// A structurally invalid inbound request.
///
/// `field` names the offending top-level field (`model`, `max_tokens`,
/// `messages`, ...) so clients can tell which part to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid request: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Everything that can fail between receiving a request and finishing the
/// response to it.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed inbound request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend answered with a non-success status.
    #[error("Backend request failed with status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The backend did not answer within the configured bound.
    #[error("Backend request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The backend answered, but the payload lacks required structure.
    #[error("Invalid backend response: {0}")]
    InvalidUpstreamResponse(String),

    /// Connection or body read failure talking to the backend.
    #[error("Backend transport error: {0}")]
    Transport(String),

    /// Anything unclassified.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Stable error type discriminant used in error bodies.
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_request_error",
            Self::Upstream { .. } | Self::InvalidUpstreamResponse(_) | Self::Transport(_) => {
                "upstream_error"
            }
            Self::Timeout(_) => "timeout_error",
            Self::Internal(_) => "internal_error",
        }
    }
}
