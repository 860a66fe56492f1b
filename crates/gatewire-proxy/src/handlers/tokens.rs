//! `POST /v1/messages/count_tokens`.

use axum::Json;
use bytes::Bytes;
use gatewire_core::{ValidationError, estimate_input_tokens};
use serde::Serialize;
use tracing::debug;

use super::parse_json;
use crate::error::HttpError;

#[derive(Debug, Serialize)]
pub struct TokenCount {
    pub input_tokens: u64,
}

/// Character-based estimate; only `messages` and `system` are considered.
pub async fn count(body: Bytes) -> Result<Json<TokenCount>, HttpError> {
    let raw = parse_json(&body)?;
    let messages = raw
        .get("messages")
        .filter(|m| m.is_array())
        .ok_or_else(|| ValidationError::new("messages", "\"messages\" must be an array"))?;

    let input_tokens = estimate_input_tokens(messages, raw.get("system"));
    debug!(input_tokens, "Estimated input tokens");

    Ok(Json(TokenCount { input_tokens }))
}
