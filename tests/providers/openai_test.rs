//! Chat completions wire format tests.

use persona_card::providers::openai::{build_request, parse_stream_data};
use persona_card::providers::{CompletionRequest, ProviderError};
use serde_json::json;

#[test]
fn build_request_sends_prompt_as_single_streamed_user_message() {
    let request = CompletionRequest {
        prompt: "Analyze this activity".to_owned(),
        max_tokens: Some(2048),
    };
    let req = build_request("llama3-70b-8192", &request);
    assert_eq!(req.model, "llama3-70b-8192");
    assert!(req.stream);
    assert_eq!(req.max_tokens, Some(2048));
    assert_eq!(req.messages.len(), 1);
    assert_eq!(req.messages[0].role, "user");
    assert_eq!(req.messages[0].content, "Analyze this activity");
}

#[test]
fn build_request_defaults_max_tokens() {
    let req = build_request("llama3-70b-8192", &CompletionRequest::new("hi"));
    assert_eq!(req.max_tokens, Some(4096));

    let value = serde_json::to_value(&req).expect("request should serialize");
    assert_eq!(value["stream"], json!(true));
    assert_eq!(value["max_tokens"], json!(4096));
    assert_eq!(value["messages"], json!([{ "role": "user", "content": "hi" }]));
}

#[test]
fn stream_data_yields_delta_text() {
    let data = json!({ "choices": [{ "index": 0, "delta": { "content": "Koji" } }] }).to_string();
    assert_eq!(
        parse_stream_data(&data).expect("chunk should parse"),
        Some("Koji".to_owned())
    );
}

#[test]
fn stream_data_skips_done_and_empty_deltas() {
    assert_eq!(parse_stream_data("[DONE]").expect("sentinel"), None);
    assert_eq!(parse_stream_data("  ").expect("keep-alive"), None);

    let role_only =
        json!({ "choices": [{ "delta": { "role": "assistant" } }] }).to_string();
    assert_eq!(parse_stream_data(&role_only).expect("role chunk"), None);

    let final_chunk =
        json!({ "choices": [{ "delta": {}, "finish_reason": "stop" }] }).to_string();
    assert_eq!(parse_stream_data(&final_chunk).expect("final chunk"), None);
}

#[test]
fn stream_error_event_is_stream_error() {
    let data = json!({ "error": { "message": "rate limit exceeded", "type": "tokens" } })
        .to_string();
    match parse_stream_data(&data) {
        Err(ProviderError::Stream(message)) => assert_eq!(message, "rate limit exceeded"),
        other => panic!("expected stream error, got: {other:?}"),
    }
}

#[test]
fn malformed_stream_chunk_is_parse_error() {
    assert!(matches!(
        parse_stream_data("{not json"),
        Err(ProviderError::Parse(_))
    ));
}
