//! Backend response → inbound response.

use serde_json::Value;

use crate::domain::{ChatCompletionResponse, ContentBlock, MessagesResponse, StopReason, Usage};
use crate::error::GatewayError;
use crate::ids;

/// Translate a complete backend response. `original_model` is the model name
/// the client asked for and is echoed back unchanged.
///
/// Only the first choice is used. Tool calls whose arguments are not valid
/// JSON are dropped with an error log.
pub fn to_source_response(
    response: ChatCompletionResponse,
    original_model: &str,
) -> Result<MessagesResponse, GatewayError> {
    let ChatCompletionResponse { id, choices, usage } = response;

    let choice = choices
        .and_then(|choices| choices.into_iter().next())
        .ok_or_else(|| {
            GatewayError::InvalidUpstreamResponse("no choices in backend response".to_string())
        })?;

    let mut content = Vec::new();

    if let Some(text) = choice.message.content
        && !text.is_empty()
    {
        content.push(ContentBlock::text(text));
    }

    for call in choice.message.tool_calls.unwrap_or_default() {
        let raw = if call.function.arguments.is_empty() {
            "{}"
        } else {
            call.function.arguments.as_str()
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(input) => content.push(ContentBlock::tool_use(call.id, call.function.name, input)),
            Err(e) => tracing::error!(
                tool_call_id = %call.id,
                tool_name = %call.function.name,
                error = %e,
                "Dropping tool call with unparseable arguments"
            ),
        }
    }

    let usage = usage.unwrap_or_default();
    let id = id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(ids::message_id);

    Ok(MessagesResponse::new(
        id,
        original_model,
        content,
        StopReason::from_finish_reason(choice.finish_reason.as_deref()),
        Usage {
            input_tokens: usage.prompt_tokens.unwrap_or(0),
            output_tokens: usage.completion_tokens.unwrap_or(0),
        },
    ))
}
