//! Inbound request → backend request.

use serde_json::Value;

use crate::domain::{
    ChatCompletionRequest, ChatContent, ChatMessage, ContentBlock, ContentPart,
    FunctionDefinition, ImageSource, ImageUrl, InputMessage, MessageContent, MessagesRequest,
    Role, StreamOptions, SystemPrompt, ToolChoice, ToolChoiceDirective, ToolChoiceParam,
    ToolDefinition, ToolSpec,
};

/// Substituted for a flattened message that would otherwise be empty.
const EMPTY_CONTENT_PLACEHOLDER: &str = "...";

/// Build the backend request for `request`, addressed to `target_model`.
pub fn to_target_request(request: &MessagesRequest, target_model: &str) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);

    if let Some(system) = request.system.as_ref().and_then(system_message) {
        messages.push(system);
    }
    messages.extend(request.messages.iter().map(translate_message));

    let stream = request.is_streaming();
    let tools = request
        .tools
        .as_deref()
        .filter(|tools| !tools.is_empty())
        .map(|tools| tools.iter().map(tool_definition).collect::<Vec<_>>());
    // tool_choice without tools is rejected by most backends
    let tool_choice = tools
        .as_ref()
        .and(request.tool_choice.as_ref())
        .and_then(tool_choice_param);

    ChatCompletionRequest {
        model: target_model.to_string(),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        top_p: request.top_p,
        stop: request
            .stop_sequences
            .clone()
            .filter(|stops| !stops.is_empty()),
        stream,
        stream_options: stream.then_some(StreamOptions {
            include_usage: true,
        }),
        tools,
        tool_choice,
    }
}

fn system_message(system: &SystemPrompt) -> Option<ChatMessage> {
    let text = match system {
        SystemPrompt::Text(text) => text.clone(),
        SystemPrompt::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text, .. } if !text.is_empty() => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    };

    (!text.is_empty()).then(|| ChatMessage {
        role: Role::System,
        content: ChatContent::Text(text),
    })
}

fn translate_message(message: &InputMessage) -> ChatMessage {
    let content = match &message.content {
        MessageContent::Text(text) => ChatContent::Text(text.clone()),
        MessageContent::Blocks(blocks) if blocks.iter().any(ContentBlock::is_image) => {
            ChatContent::Parts(blocks.iter().filter_map(content_part).collect())
        }
        MessageContent::Blocks(blocks) => ChatContent::Text(flatten_blocks(blocks)),
    };

    ChatMessage {
        role: message.role,
        content,
    }
}

/// Array form: text and images only, tool blocks are dropped.
fn content_part(block: &ContentBlock) -> Option<ContentPart> {
    match block {
        ContentBlock::Text { text, .. } if !text.is_empty() => {
            Some(ContentPart::Text { text: text.clone() })
        }
        ContentBlock::Image { source, .. } => {
            let url = match source {
                ImageSource::Base64 { media_type, data } => {
                    format!("data:{media_type};base64,{data}")
                }
                ImageSource::Url { url } => url.clone(),
                ImageSource::Unsupported => return None,
            };
            Some(ContentPart::ImageUrl {
                image_url: ImageUrl { url },
            })
        }
        _ => None,
    }
}

/// String form: every block rendered as text, empties skipped, never empty.
fn flatten_blocks(blocks: &[ContentBlock]) -> String {
    let text = blocks
        .iter()
        .map(block_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        EMPTY_CONTENT_PLACEHOLDER.to_string()
    } else {
        text
    }
}

fn block_text(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Text { text, .. } => text.clone(),
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            ..
        } => {
            let body = match content {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            format!(
                "[Tool Result: {}]\n{body}",
                tool_use_id.as_deref().unwrap_or("unknown")
            )
        }
        ContentBlock::ToolUse { name, input, .. } => {
            let input = input
                .as_ref()
                .map_or_else(|| "{}".to_string(), Value::to_string);
            format!("[Tool Use: {}]\n{input}", name.as_deref().unwrap_or("unknown"))
        }
        ContentBlock::Image { .. } | ContentBlock::Unknown => String::new(),
    }
}

fn tool_definition(tool: &ToolSpec) -> ToolDefinition {
    ToolDefinition {
        r#type: "function".to_string(),
        function: FunctionDefinition {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        },
    }
}

fn tool_choice_param(choice: &ToolChoice) -> Option<ToolChoiceParam> {
    match choice {
        ToolChoice::Mode(mode) => Some(ToolChoiceParam::Mode(mode.clone())),
        ToolChoice::Directive(directive) => match directive {
            ToolChoiceDirective::Tool { name } => Some(ToolChoiceParam::function(name.clone())),
            ToolChoiceDirective::Auto => Some(ToolChoiceParam::Mode("auto".to_string())),
            ToolChoiceDirective::Any => Some(ToolChoiceParam::Mode("required".to_string())),
            ToolChoiceDirective::Disabled => Some(ToolChoiceParam::Mode("none".to_string())),
            ToolChoiceDirective::Unsupported => None,
        },
    }
}
