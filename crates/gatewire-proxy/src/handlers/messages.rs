//! `POST /v1/messages`: translate, forward, translate back.

use std::time::Instant;

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response, Sse},
};
use bytes::Bytes;
use futures_util::StreamExt;
use gatewire_core::{StreamReencoder, parse_request, to_source_response, to_target_request};
use tracing::{info, warn};

use super::parse_json;
use crate::error::HttpError;
use crate::request_id::RequestId;
use crate::state::AppState;
use crate::stream::{reencode_stream, to_sse_event};

pub async fn create(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    match handle(&state, request_id.clone(), &body, start).await {
        Ok(response) => response,
        Err(err) => {
            warn!(
                request_id = %request_id,
                duration_ms = start.elapsed().as_millis(),
                status = err.status().as_u16(),
                error = %err,
                "Messages request failed"
            );
            err.for_environment(state.config.environment).into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    request_id: String,
    body: &Bytes,
    start: Instant,
) -> Result<Response, HttpError> {
    let request = parse_request(parse_json(body)?)?;
    let target = to_target_request(&request, &state.config.target_model);

    info!(
        request_id = %request_id,
        model = %request.model,
        target_model = %target.model,
        stream = target.stream,
        messages = request.messages.len(),
        tools = target.tools.as_ref().map_or(0, Vec::len),
        max_tokens = request.max_tokens,
        "Handling messages request"
    );

    if target.stream {
        let body = state.backend.stream(&target, &request_id).await?;
        let events = reencode_stream(body, StreamReencoder::new(request.model), request_id, start)
            .map(|item| item.and_then(|event| to_sse_event(&event)));

        return Ok((
            [(
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            )],
            Sse::new(events),
        )
            .into_response());
    }

    let upstream = state.backend.complete(&target, &request_id).await?;
    let response = to_source_response(upstream, &request.model)?;

    info!(
        request_id = %request_id,
        message_id = %response.id,
        duration_ms = start.elapsed().as_millis(),
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        content_blocks = response.content.len(),
        stop_reason = response.stop_reason.as_str(),
        "Messages request completed"
    );

    Ok(Json(response).into_response())
}
