//! HTTP request handlers.
//!
//! Handlers are thin: parse, delegate to the core translators and the
//! backend port, map errors.

pub mod messages;
pub mod service;
pub mod tokens;

use bytes::Bytes;
use serde_json::Value;

use crate::error::HttpError;

/// Parse a request body as JSON.
fn parse_json(body: &Bytes) -> Result<Value, HttpError> {
    serde_json::from_slice(body)
        .map_err(|e| HttpError::InvalidRequest(format!("Invalid request: body is not valid JSON: {e}")))
}
