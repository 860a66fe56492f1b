//! Shared test fixtures: an in-memory backend and request helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use gatewire_core::{
    BackendHealth, ByteStream, ChatBackend, ChatCompletionRequest, ChatCompletionResponse,
    GatewayError,
};
use gatewire_proxy::{GatewayConfig, GatewayState, create_router};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// What the scripted backend answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Non-streaming JSON body.
    Json(Value),
    /// Streaming body delivered in these chunks.
    Chunks(Vec<String>),
    /// Error status with message.
    Status(u16, String),
    Timeout,
    Internal(String),
}

impl Reply {
    fn into_error(self) -> Option<GatewayError> {
        match self {
            Self::Status(status, message) => Some(GatewayError::Upstream { status, message }),
            Self::Timeout => Some(GatewayError::Timeout(Duration::from_secs(120))),
            Self::Internal(msg) => Some(GatewayError::Internal(msg)),
            Self::Json(_) | Self::Chunks(_) => None,
        }
    }
}

/// Backend that replays a fixed reply and records what it was sent.
pub struct ScriptedBackend {
    reply: Reply,
    health: BackendHealth,
    pub seen: Mutex<Vec<(ChatCompletionRequest, String)>>,
}

impl ScriptedBackend {
    pub fn new(reply: Reply) -> Arc<Self> {
        Self::with_health(reply, BackendHealth::Connected)
    }

    pub fn with_health(reply: Reply, health: BackendHealth) -> Arc<Self> {
        Arc::new(Self {
            reply,
            health,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn last_request(&self) -> (ChatCompletionRequest, String) {
        self.seen.lock().unwrap().last().cloned().expect("backend was not called")
    }

    fn record(&self, request: &ChatCompletionRequest, request_id: &str) {
        self.seen
            .lock()
            .unwrap()
            .push((request.clone(), request_id.to_string()));
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ChatCompletionResponse, GatewayError> {
        self.record(request, request_id);
        match self.reply.clone() {
            Reply::Json(body) => Ok(serde_json::from_value(body).unwrap()),
            other => Err(other.into_error().expect("streaming reply on non-streaming call")),
        }
    }

    async fn stream(
        &self,
        request: &ChatCompletionRequest,
        request_id: &str,
    ) -> Result<ByteStream, GatewayError> {
        self.record(request, request_id);
        match self.reply.clone() {
            Reply::Chunks(chunks) => Ok(stream::iter(
                chunks
                    .into_iter()
                    .map(|chunk| Ok::<_, GatewayError>(Bytes::from(chunk))),
            )
            .boxed()),
            other => Err(other.into_error().expect("json reply on streaming call")),
        }
    }

    async fn health(&self) -> BackendHealth {
        self.health
    }

    fn base_url(&self) -> &str {
        "http://scripted.test"
    }
}

pub fn router(backend: Arc<ScriptedBackend>) -> Router {
    router_with_config(backend, GatewayConfig::default())
}

pub fn router_with_config(backend: Arc<ScriptedBackend>, config: GatewayConfig) -> Router {
    create_router(Arc::new(GatewayState::new(config, backend)))
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Split an SSE body into `(event name, data json)` pairs.
pub fn parse_sse(body: &[u8]) -> Vec<(String, Value)> {
    let text = std::str::from_utf8(body).unwrap();
    text.split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .map(|frame| {
            let mut name = String::new();
            let mut data = String::new();
            for line in frame.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    name = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push_str(value.trim());
                }
            }
            (name, serde_json::from_str(&data).unwrap())
        })
        .collect()
}
