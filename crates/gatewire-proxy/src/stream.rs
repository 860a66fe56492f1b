//! Async driver for the stream reencoder.
//!
//! Pulls bytes from the backend only when the client is ready for more
//! events, so a slow client stalls the backend read instead of buffering.
//! Dropping the returned stream drops the backend body and releases the
//! connection.

use std::collections::VecDeque;
use std::time::Instant;

use axum::response::sse::Event;
use futures_util::{Stream, StreamExt};
use gatewire_core::{ByteStream, GatewayError, LineBuffer, OutputEvent, StreamReencoder};
use tracing::{error, info, warn};

/// State threaded through the `unfold` stream.
struct ReencodeState {
    body: ByteStream,
    lines: LineBuffer,
    reencoder: StreamReencoder,
    pending: VecDeque<OutputEvent>,
    request_id: String,
    start: Instant,
    done: bool,
}

/// Turn a backend event-stream body into inbound-protocol events.
///
/// The sequence ends after `message_stop`, or with a single `Err` if reading
/// the body fails mid-stream.
pub fn reencode_stream(
    body: ByteStream,
    mut reencoder: StreamReencoder,
    request_id: String,
    start: Instant,
) -> impl Stream<Item = Result<OutputEvent, GatewayError>> + Send + 'static {
    let state = ReencodeState {
        body,
        lines: LineBuffer::new(),
        pending: reencoder.start().into(),
        reencoder,
        request_id,
        start,
        done: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                return Some((Ok(event), st));
            }
            if st.done {
                return None;
            }
            if st.reencoder.is_finished() {
                st.done = true;
                log_completion(&st);
                continue;
            }

            if let Some(line) = st.lines.next_line() {
                st.pending.extend(st.reencoder.process_line(&line));
                continue;
            }

            match st.body.next().await {
                Some(Ok(chunk)) => st.lines.push(&chunk),
                Some(Err(e)) => {
                    error!(
                        request_id = %st.request_id,
                        duration_ms = st.start.elapsed().as_millis(),
                        error = %e,
                        "Backend stream failed"
                    );
                    st.done = true;
                    return Some((Err(e), st));
                }
                None => {
                    if let Some(rest) = st.lines.take_remainder() {
                        st.pending.extend(st.reencoder.process_line(&rest));
                    }
                    st.pending.extend(st.reencoder.finish_eof());
                }
            }
        }
    })
}

/// Frame one event for the client.
pub fn to_sse_event(event: &OutputEvent) -> Result<Event, GatewayError> {
    let data = serde_json::to_string(event)
        .map_err(|e| GatewayError::Internal(format!("Failed to serialize event: {e}")))?;
    Ok(Event::default().event(event.event_name()).data(data))
}

fn log_completion(st: &ReencodeState) {
    let state = st.reencoder.state();

    for slot in &state.tool_calls {
        if slot.parsed_arguments().is_none() {
            warn!(
                request_id = %st.request_id,
                tool_call_id = %slot.id,
                tool_name = %slot.name,
                "Streamed tool call arguments are not valid JSON"
            );
        }
    }

    info!(
        request_id = %st.request_id,
        message_id = %state.message_id,
        duration_ms = st.start.elapsed().as_millis(),
        input_tokens = state.input_tokens,
        output_tokens = state.output_tokens,
        tool_calls = state.tool_calls.len(),
        stop_reason = state.stop_reason.map_or("none", |r| r.as_str()),
        "Streaming response completed"
    );
}
