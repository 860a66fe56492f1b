//! HTTP error mapping.
//!
//! Every failure leaves a handler as an [`HttpError`], which renders the
//! message-API error body:
//!
//! ```json
//! {"type": "error", "error": {"type": "invalid_request_error", "message": "..."}}
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatewire_core::{GatewayError, ValidationError};
use serde::Serialize;
use thiserror::Error;

use crate::config::Environment;

/// Message shown instead of internal details in production.
const REDACTED_INTERNAL_MESSAGE: &str = "Internal server error";

/// Axum-facing error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Malformed inbound request (400).
    #[error("{0}")]
    InvalidRequest(String),

    /// The backend answered with an error status; relayed as-is.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Backend call exceeded its bound (504).
    #[error("{0}")]
    Timeout(String),

    /// Backend unreachable or answered with an unusable payload (502).
    #[error("{0}")]
    BadGateway(String),

    /// Anything unclassified (500).
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    r#type: &'static str,
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    r#type: &'static str,
    message: &'a str,
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => *status,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable discriminant placed in `error.type`.
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Upstream { .. } | Self::BadGateway(_) => "upstream_error",
            Self::Timeout(_) => "timeout_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Hide internal details from clients in production.
    #[must_use]
    pub fn for_environment(self, environment: Environment) -> Self {
        match self {
            Self::Internal(_) if environment.is_production() => {
                Self::Internal(REDACTED_INTERNAL_MESSAGE.to_string())
            }
            other => other,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = ErrorEnvelope {
            r#type: "error",
            error: ErrorDetail {
                r#type: self.error_type(),
                message: &message,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<GatewayError> for HttpError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(e) => e.into(),
            GatewayError::Upstream { status, message } => Self::Upstream {
                status: StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            e @ GatewayError::Timeout(_) => Self::Timeout(e.to_string()),
            e @ (GatewayError::InvalidUpstreamResponse(_) | GatewayError::Transport(_)) => {
                Self::BadGateway(e.to_string())
            }
            GatewayError::Internal(msg) => Self::Internal(msg),
        }
    }
}
