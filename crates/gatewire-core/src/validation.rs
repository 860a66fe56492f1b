//! Structural validation of inbound requests.
//!
//! Runs on the raw JSON body before typed deserialization so that the error
//! can name the exact offending field. Downstream components may assume a
//! request that passed [`parse_request`] is well formed.

use serde_json::Value;

use crate::domain::MessagesRequest;
use crate::error::ValidationError;

/// Check the required top-level fields of a `POST /v1/messages` body.
///
/// - `model` is a non-empty string
/// - `max_tokens` is a positive integer no larger than `u32::MAX`
/// - `messages` is a non-empty array
pub fn validate_request(body: &Value) -> Result<(), ValidationError> {
    let Some(obj) = body.as_object() else {
        return Err(ValidationError::new(
            "body",
            "request body must be a JSON object",
        ));
    };

    match obj.get("model") {
        Some(Value::String(model)) if !model.is_empty() => {}
        _ => {
            return Err(ValidationError::new(
                "model",
                "missing or invalid \"model\" field",
            ));
        }
    }

    match obj.get("max_tokens") {
        Some(Value::Number(n))
            if n
                .as_u64()
                .is_some_and(|n| n > 0 && u32::try_from(n).is_ok()) => {}
        Some(Value::Number(_)) => {
            return Err(ValidationError::new(
                "max_tokens",
                "\"max_tokens\" must be a positive integer within u32 range",
            ));
        }
        _ => {
            return Err(ValidationError::new(
                "max_tokens",
                "missing or invalid \"max_tokens\" field",
            ));
        }
    }

    match obj.get("messages") {
        Some(Value::Array(messages)) if !messages.is_empty() => Ok(()),
        Some(Value::Array(_)) => Err(ValidationError::new(
            "messages",
            "\"messages\" array cannot be empty",
        )),
        _ => Err(ValidationError::new(
            "messages",
            "\"messages\" must be an array",
        )),
    }
}

/// Validate and then deserialize a raw body into a [`MessagesRequest`].
pub fn parse_request(body: Value) -> Result<MessagesRequest, ValidationError> {
    validate_request(&body)?;
    serde_json::from_value(body).map_err(|e| ValidationError::new("request", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "model": "claude-x",
            "max_tokens": 100,
            "messages": [{"role": "user", "content": "hi"}]
        })
    }

    fn field_of(body: &Value) -> String {
        validate_request(body).unwrap_err().field
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_request(&valid_body()).is_ok());
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(field_of(&json!([1, 2])), "body");
    }

    #[test]
    fn test_model_missing_empty_or_wrong_type() {
        for model in [Value::Null, json!(""), json!(42)] {
            let mut body = valid_body();
            body["model"] = model;
            assert_eq!(field_of(&body), "model");
        }
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("model");
        assert_eq!(field_of(&body), "model");
    }

    #[test]
    fn test_max_tokens_must_be_positive_number() {
        for max_tokens in [json!(0), json!(-5), json!("100"), Value::Null] {
            let mut body = valid_body();
            body["max_tokens"] = max_tokens;
            assert_eq!(field_of(&body), "max_tokens");
        }
    }

    #[test]
    fn test_max_tokens_must_fit_the_typed_field() {
        for max_tokens in [json!(100.0), json!(12.5), json!(5_000_000_000_u64)] {
            let mut body = valid_body();
            body["max_tokens"] = max_tokens.clone();

            let err = parse_request(body).unwrap_err();
            assert_eq!(err.field, "max_tokens", "{max_tokens}");
            assert!(err.message.contains("positive integer"), "{}", err.message);
        }

        let mut body = valid_body();
        body["max_tokens"] = json!(u32::MAX);
        assert_eq!(parse_request(body).unwrap().max_tokens, u32::MAX);
    }

    #[test]
    fn test_messages_must_be_non_empty_array() {
        let mut body = valid_body();
        body["messages"] = json!([]);
        let err = validate_request(&body).unwrap_err();
        assert_eq!(err.field, "messages");
        assert!(err.message.contains("cannot be empty"));

        body["messages"] = json!("hi");
        let err = validate_request(&body).unwrap_err();
        assert_eq!(err.field, "messages");
        assert!(err.message.contains("must be an array"));
    }

    #[test]
    fn test_parse_request_reports_typed_failures() {
        let mut body = valid_body();
        body["messages"] = json!([{"role": "narrator", "content": "hi"}]);
        let err = parse_request(body).unwrap_err();
        assert_eq!(err.field, "request");
    }

    #[test]
    fn test_parse_request_success() {
        let req = parse_request(valid_body()).unwrap();
        assert_eq!(req.model, "claude-x");
        assert_eq!(req.messages.len(), 1);
    }
}
