//! Router-level tests against a scripted backend.

mod common;

use axum::http::StatusCode;
use gatewire_core::BackendHealth;
use gatewire_proxy::{Environment, GatewayConfig};
use serde_json::{Value, json};

use common::{
    Reply, ScriptedBackend, body_bytes, body_json, get, parse_sse, post_json, router,
    router_with_config, send,
};

fn hello_request() -> Value {
    json!({
        "model": "claude-x",
        "max_tokens": 100,
        "messages": [{"role": "user", "content": "hi"}]
    })
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-42",
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 9, "completion_tokens": 2}
    })
}

fn unused_backend() -> std::sync::Arc<ScriptedBackend> {
    ScriptedBackend::new(Reply::Internal("backend should not be called".into()))
}

#[tokio::test]
async fn root_returns_metadata_with_hardening_headers() {
    let response = send(router(unused_backend()), get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    assert!(headers.contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["name"], "gatewire");
    assert_eq!(body["target_model"], "gpt-4o");
    assert_eq!(body["endpoints"]["messages"], "POST /v1/messages");
}

#[tokio::test]
async fn health_reports_backend_state() {
    let response = send(router(unused_backend()), get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"]["status"], "connected");
    assert_eq!(body["backend"]["url"], "http://scripted.test");
    assert!(body["timestamp"].is_string());
    assert!(body["uptime_secs"].is_u64());

    let backend = ScriptedBackend::with_health(Reply::Internal(String::new()), BackendHealth::Unreachable);
    let response = send(router(backend), get("/health")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["backend"]["status"], "error");

    let backend = ScriptedBackend::with_health(Reply::Internal(String::new()), BackendHealth::Disconnected);
    let response = send(router(backend), get("/health")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["status"], "degraded");
}

#[tokio::test]
async fn count_tokens_estimates_from_serialized_length() {
    // `[{"role":"user","content":""}]` is 30 characters; pad content to 400.
    let content = "x".repeat(370);
    let body = json!({"model": "claude-x", "messages": [{"role": "user", "content": content}]});

    let response = send(router(unused_backend()), post_json("/v1/messages/count_tokens", &body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"input_tokens": 100}));
}

#[tokio::test]
async fn count_tokens_includes_system() {
    let body = json!({
        "messages": [{"role": "user", "content": "x".repeat(370)}],
        "system": "abcd"
    });
    // 400 + 6 ("\"abcd\"") = 406 characters
    let response = send(router(unused_backend()), post_json("/v1/messages/count_tokens", &body)).await;
    assert_eq!(body_json(response).await, json!({"input_tokens": 102}));
}

#[tokio::test]
async fn count_tokens_rejects_non_array_messages() {
    let body = json!({"messages": "hi"});
    let response = send(router(unused_backend()), post_json("/v1/messages/count_tokens", &body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["type"], "error");
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn messages_rejects_invalid_requests() {
    let cases = [
        (json!({"max_tokens": 10, "messages": [{"role": "user", "content": "hi"}]}), "model"),
        (json!({"model": "claude-x", "messages": [{"role": "user", "content": "hi"}]}), "max_tokens"),
        (json!({"model": "claude-x", "max_tokens": 0, "messages": [{"role": "user", "content": "hi"}]}), "max_tokens"),
        (json!({"model": "claude-x", "max_tokens": 100.5, "messages": [{"role": "user", "content": "hi"}]}), "max_tokens"),
        (json!({"model": "claude-x", "max_tokens": 5_000_000_000_u64, "messages": [{"role": "user", "content": "hi"}]}), "max_tokens"),
        (json!({"model": "claude-x", "max_tokens": 10, "messages": []}), "messages"),
        (json!({"model": "claude-x", "max_tokens": 10, "messages": "hi"}), "messages"),
    ];

    for (body, field) in cases {
        let backend = unused_backend();
        let response = send(router(backend.clone()), post_json("/v1/messages", &body)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let body = body_json(response).await;
        assert_eq!(body["type"], "error");
        assert_eq!(body["error"]["type"], "invalid_request_error");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains(field), "{message} should mention {field}");
        assert!(backend.seen.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn messages_rejects_malformed_json() {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/messages")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = send(router(unused_backend()), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn messages_non_streaming_round_trip() {
    let backend = ScriptedBackend::new(Reply::Json(completion("hello")));
    let mut request = hello_request();
    request["system"] = json!("be brief");
    request["temperature"] = json!(0.5);

    let response = send(router(backend.clone()), post_json("/v1/messages", &request)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response.headers()["x-request-id"].to_str().unwrap().to_string();
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "id": "chatcmpl-42",
            "type": "message",
            "role": "assistant",
            "model": "claude-x",
            "content": [{"type": "text", "text": "hello"}],
            "stop_reason": "end_turn",
            "stop_sequence": null,
            "usage": {"input_tokens": 9, "output_tokens": 2}
        })
    );

    let (sent, sent_id) = backend.last_request();
    assert_eq!(sent_id, request_id);
    assert_eq!(
        serde_json::to_value(&sent).unwrap(),
        json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ],
            "max_tokens": 100,
            "temperature": 0.5,
            "stream": false
        })
    );
}

#[tokio::test]
async fn client_request_id_is_reused() {
    let backend = ScriptedBackend::new(Reply::Json(completion("ok")));
    let mut request = post_json("/v1/messages", &hello_request());
    request
        .headers_mut()
        .insert("x-request-id", "client-abc".parse().unwrap());

    let response = send(router(backend.clone()), request).await;

    assert_eq!(response.headers()["x-request-id"], "client-abc");
    assert_eq!(backend.last_request().1, "client-abc");
}

#[tokio::test]
async fn messages_relays_upstream_status() {
    let backend = ScriptedBackend::new(Reply::Status(429, "rate limited".into()));
    let response = send(router(backend), post_json("/v1/messages", &hello_request())).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"type": "error", "error": {"type": "upstream_error", "message": "rate limited"}})
    );
}

#[tokio::test]
async fn messages_timeout_is_504() {
    let backend = ScriptedBackend::new(Reply::Timeout);
    let response = send(router(backend), post_json("/v1/messages", &hello_request())).await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(response).await["error"]["type"], "timeout_error");
}

#[tokio::test]
async fn messages_without_choices_is_502() {
    let backend = ScriptedBackend::new(Reply::Json(json!({"id": "x", "choices": []})));
    let response = send(router(backend), post_json("/v1/messages", &hello_request())).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"]["type"], "upstream_error");
}

#[tokio::test]
async fn internal_errors_are_redacted_in_production() {
    let config = GatewayConfig {
        environment: Environment::Production,
        ..GatewayConfig::default()
    };
    let backend = ScriptedBackend::new(Reply::Internal("secret detail".into()));
    let response = send(
        router_with_config(backend, config),
        post_json("/v1/messages", &hello_request()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"type": "error", "error": {"type": "internal_error", "message": "Internal server error"}})
    );

    let backend = ScriptedBackend::new(Reply::Internal("secret detail".into()));
    let response = send(router(backend), post_json("/v1/messages", &hello_request())).await;
    assert_eq!(body_json(response).await["error"]["message"], "secret detail");
}

#[tokio::test]
async fn messages_streams_reencoded_events() {
    let backend = ScriptedBackend::new(Reply::Chunks(vec![
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n".into(),
        "data: {\"choices\":[{\"delta\":{\"content\":\" wor".into(),
        "ld\"}}]}\n\ndata: {not json}\n\n".into(),
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}],\"usage\":{\"prompt_tokens\":4,\"completion_tokens\":2}}\n\n".into(),
        "data: [DONE]\n\n".into(),
    ]));
    let mut request = hello_request();
    request["stream"] = json!(true);

    let response = send(router(backend.clone()), post_json("/v1/messages", &request)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let events = parse_sse(&body_bytes(response).await);
    let names: Vec<&str> = events.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "message_start",
            "content_block_start",
            "ping",
            "content_block_delta",
            "content_block_delta",
            "content_block_stop",
            "message_delta",
            "message_stop",
        ]
    );

    assert_eq!(events[0].1["message"]["model"], "claude-x");
    assert_eq!(events[3].1["delta"], json!({"type": "text_delta", "text": "Hello"}));
    assert_eq!(events[4].1["delta"], json!({"type": "text_delta", "text": " world"}));
    assert_eq!(
        events[6].1,
        json!({
            "type": "message_delta",
            "delta": {"stop_reason": "end_turn", "stop_sequence": null},
            "usage": {"output_tokens": 2}
        })
    );
    for (name, data) in &events {
        assert_eq!(data["type"], name.as_str());
    }

    let (sent, _) = backend.last_request();
    assert!(sent.stream);
    assert_eq!(
        serde_json::to_value(sent.stream_options).unwrap(),
        json!({"include_usage": true})
    );
}

#[tokio::test]
async fn messages_streams_tool_calls() {
    let backend = ScriptedBackend::new(Reply::Chunks(vec![
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"calc\",\"arguments\":\"{\\\"a\\\":1\"}}]}}]}\n\n".into(),
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"}\"}}]}}]}\n\n".into(),
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n".into(),
    ]));
    let mut request = hello_request();
    request["stream"] = json!(true);
    request["tools"] = json!([{"name": "calc", "input_schema": {"type": "object"}}]);

    let response = send(router(backend), post_json("/v1/messages", &request)).await;
    let events = parse_sse(&body_bytes(response).await);

    let partials: String = events
        .iter()
        .filter(|(name, data)| name == "content_block_delta" && data["index"] == 1)
        .map(|(_, data)| data["delta"]["partial_json"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(serde_json::from_str::<Value>(&partials).unwrap(), json!({"a": 1}));

    let start = events
        .iter()
        .find(|(name, data)| name == "content_block_start" && data["index"] == 1)
        .unwrap();
    assert_eq!(
        start.1["content_block"],
        json!({"type": "tool_use", "id": "call_1", "name": "calc", "input": {}})
    );

    let delta = events.iter().find(|(name, _)| name == "message_delta").unwrap();
    assert_eq!(delta.1["delta"]["stop_reason"], "tool_use");
    assert_eq!(events.last().unwrap().0, "message_stop");
}

#[tokio::test]
async fn streaming_upstream_error_is_reported_before_stream_starts() {
    let backend = ScriptedBackend::new(Reply::Status(503, "overloaded".into()));
    let mut request = hello_request();
    request["stream"] = json!(true);

    let response = send(router(backend), post_json("/v1/messages", &request)).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"]["message"], "overloaded");
}
