//! Port definition for the chat-completion backend.
//!
//! The HTTP adapter implements [`ChatBackend`] over a real connection; tests
//! implement it in memory. No transport types appear in any signature.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;

use crate::domain::{ChatCompletionRequest, ChatCompletionResponse};
use crate::error::GatewayError;

/// Raw body of a streaming backend response, in arbitrary chunk sizes.
///
/// Dropping the stream must release the underlying connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, GatewayError>> + Send>>;

/// Result of probing the backend's health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendHealth {
    /// Reachable and answering with a success status.
    Connected,
    /// Reachable but answering with an error status.
    Disconnected,
    /// Not reachable within the probe bound.
    Unreachable,
}

impl BackendHealth {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Unreachable => "error",
        }
    }
}

/// A backend that speaks the chat-completion protocol.
///
/// One call per inbound request; implementations must not retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a non-streaming request and decode the full response.
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ChatCompletionResponse, GatewayError>;

    /// Send a streaming request. Resolves once response headers arrive with a
    /// success status; the body is then read through the returned stream.
    async fn stream(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ByteStream, GatewayError>;

    /// Probe the backend's health endpoint.
    async fn health(&self) -> BackendHealth;

    /// Base URL requests are sent to, for diagnostics.
    fn base_url(&self) -> &str;
}
