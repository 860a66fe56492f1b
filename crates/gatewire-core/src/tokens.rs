//! Character-based input token estimate.
//!
//! Not a tokenizer: the estimate is `ceil(chars / 4)` over the compact JSON
//! serialization of `messages` and `system`. Characters are counted in UTF-16
//! code units so the figure matches what JavaScript clients compute for the
//! same payload.

use serde_json::Value;

const CHARS_PER_TOKEN: usize = 4;

/// Estimate input tokens for a `count_tokens` request.
///
/// An absent, null or empty-string `system` contributes nothing.
pub fn estimate_input_tokens(messages: &Value, system: Option<&Value>) -> u64 {
    let system_chars = match system {
        None | Some(Value::Null) => 0,
        Some(Value::String(s)) if s.is_empty() => 0,
        Some(value) => serialized_len(value),
    };
    let total = serialized_len(messages) + system_chars;
    total.div_ceil(CHARS_PER_TOKEN) as u64
}

fn serialized_len(value: &Value) -> usize {
    serde_json::to_string(value).map_or(0, |s| s.encode_utf16().count())
}
