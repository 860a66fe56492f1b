//! Service endpoints: `GET /health` and `GET /`.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use gatewire_core::BackendHealth;
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: &'static str,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub backend: BackendStatus,
}

#[derive(Debug, Serialize)]
pub struct BackendStatus {
    /// `connected`, `disconnected` or `error`.
    pub status: &'static str,
    pub url: String,
}

/// Probe the backend and report. 200 only when the backend answers healthy.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let backend = state.backend.health().await;
    let (status, code) = match backend {
        BackendHealth::Connected => ("healthy", StatusCode::OK),
        BackendHealth::Disconnected => ("degraded", StatusCode::SERVICE_UNAVAILABLE),
        BackendHealth::Unreachable => ("unhealthy", StatusCode::SERVICE_UNAVAILABLE),
    };

    (
        code,
        Json(HealthResponse {
            status,
            timestamp: Utc::now().to_rfc3339(),
            uptime_secs: state.started_at.elapsed().as_secs(),
            backend: BackendStatus {
                status: backend.as_str(),
                url: state.backend.base_url().to_string(),
            },
        }),
    )
}

/// Service metadata.
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "gatewire",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Message-API to chat-completions gateway",
        "target_model": state.config.target_model,
        "environment": state.config.environment.as_str(),
        "endpoints": {
            "messages": "POST /v1/messages",
            "count_tokens": "POST /v1/messages/count_tokens",
            "health": "GET /health"
        }
    }))
}
