//! reqwest-backed [`ChatBackend`].
//!
//! One attempt per call, no retries. Non-streaming calls are bounded end to
//! end by the request timeout. Streaming calls are bounded until response
//! headers arrive, and after that each body read gets the same bound, so a
//! long generation survives while a stalled backend does not.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use gatewire_core::{
    BackendHealth, ByteStream, ChatBackend, ChatCompletionRequest, ChatCompletionResponse,
    GatewayError,
};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::GatewayConfig;

/// Bound on the health probe, independent of the request timeout.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Header carrying the gateway's request id to the backend.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for a chat-completion backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.backend_base().to_string(),
            api_key: config
                .backend_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            timeout: config.request_timeout,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn post(&self, request: &ChatCompletionRequest, request_id: &str) -> RequestBuilder {
        let builder = self
            .client
            .post(self.completions_url())
            .header(REQUEST_ID_HEADER, request_id)
            .json(request);

        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn map_send_error(&self, err: &reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            error!(url = %self.completions_url(), error = %err, "Backend request failed");
            GatewayError::Transport(err.to_string())
        }
    }

    /// Pass success through; turn anything else into [`GatewayError::Upstream`].
    async fn check_status(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = upstream_error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Backend request failed")
                .to_string()
        });
        error!(status = status.as_u16(), message = %message, "Backend returned error status");

        Err(GatewayError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ChatCompletionResponse, GatewayError> {
        debug!(url = %self.completions_url(), request_id, "Forwarding non-streaming request");

        let response = self
            .post(request, request_id)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;
        let response = Self::check_status(response).await?;

        let body = response.bytes().await.map_err(|e| self.map_send_error(&e))?;
        serde_json::from_slice(&body).map_err(|e| {
            GatewayError::InvalidUpstreamResponse(format!("undecodable backend response: {e}"))
        })
    }

    async fn stream(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ByteStream, GatewayError> {
        debug!(url = %self.completions_url(), request_id, "Forwarding streaming request");

        let response = tokio::time::timeout(self.timeout, self.post(request, request_id).send())
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))?
            .map_err(|e| self.map_send_error(&e))?;
        let response = Self::check_status(response).await?;

        Ok(idle_bounded(response, self.timeout))
    }

    async fn health(&self) -> BackendHealth {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(HEALTH_PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => BackendHealth::Connected,
            Ok(response) => {
                debug!(url = %url, status = response.status().as_u16(), "Backend health probe failed");
                BackendHealth::Disconnected
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Backend unreachable");
                BackendHealth::Unreachable
            }
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Body stream whose every read must complete within `idle`.
///
/// A missed bound yields [`GatewayError::Timeout`] and ends the stream.
fn idle_bounded(response: Response, idle: Duration) -> ByteStream {
    let body = Box::pin(response.bytes_stream());
    stream::unfold(Some(body), move |body| async move {
        let mut body = body?;
        match tokio::time::timeout(idle, body.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(body))),
            Ok(Some(Err(e))) => {
                let err = if e.is_timeout() {
                    GatewayError::Timeout(idle)
                } else {
                    GatewayError::Transport(e.to_string())
                };
                Some((Err(err), None))
            }
            Ok(None) => None,
            Err(_) => {
                warn!(idle_secs = idle.as_secs(), "Backend stream stalled");
                Some((Err(GatewayError::Timeout(idle)), None))
            }
        }
    })
    .boxed()
}

/// `error.message` from a JSON error body, else the trimmed raw body.
fn upstream_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.get("message"))
            .or_else(|| v.get("error").filter(|e| e.is_string()))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    Some(from_json.unwrap_or_else(|| body.to_string()))
}
