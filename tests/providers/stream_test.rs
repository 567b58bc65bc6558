//! Streaming calls against a canned local endpoint.

use persona_card::providers::openai::OpenAiCompatProvider;
use persona_card::providers::{
    collect_stream, provider_from_spec, CompletionRequest, LlmProvider, ProviderError,
};
use serde_json::json;

use crate::support::{serve, Route};

fn provider_for(base: &str) -> OpenAiCompatProvider {
    OpenAiCompatProvider::new(
        "groq/llama3-70b-8192".to_owned(),
        "llama3-70b-8192".to_owned(),
        "gsk_test_key".to_owned(),
        format!("{base}/openai/v1/"),
    )
}

fn sse(chunks: &[&str]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        let data = json!({ "choices": [{ "index": 0, "delta": { "content": chunk } }] });
        body.push_str(&format!("data: {data}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn stream_yields_deltas_in_order() {
    let base = serve(vec![Route::event_stream(
        "/chat/completions",
        sse(&["**Name:**", "\nKoji", " Ed"]),
    )])
    .await;

    let opened = provider_for(&base)
        .stream(CompletionRequest::new("persona please"))
        .await;
    assert!(opened.is_ok());
    let stream = match opened {
        Ok(stream) => stream,
        Err(err) => panic!("stream should open: {err}"),
    };

    let mut deltas = Vec::new();
    let collected = collect_stream(stream, |delta| deltas.push(delta.to_owned())).await;
    assert!(collected.is_ok());
    let text = match collected {
        Ok(text) => text,
        Err(err) => panic!("stream should complete: {err}"),
    };
    assert_eq!(deltas, vec!["**Name:**", "\nKoji", " Ed"]);
    assert_eq!(text, "**Name:**\nKoji Ed");
}

#[tokio::test]
async fn stream_error_event_ends_collection() {
    let body = format!(
        "{}data: {}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n",
        json!({ "error": { "message": "model overloaded" } })
    );
    let base = serve(vec![Route::event_stream("/chat/completions", body)]).await;

    let stream = provider_for(&base)
        .stream(CompletionRequest::new("persona please"))
        .await
        .expect("stream should open");
    let collected = collect_stream(stream, |_| {}).await;
    match collected {
        Err(ProviderError::Stream(message)) => assert!(message.contains("model overloaded")),
        other => panic!("expected stream error, got: {other:?}"),
    }
}

#[tokio::test]
async fn stream_rejects_error_status_before_reading() {
    let base = serve(vec![Route::json(
        "/chat/completions",
        401,
        json!({ "error": { "message": "Invalid API Key" } }).to_string(),
    )])
    .await;

    let opened = provider_for(&base)
        .stream(CompletionRequest::new("persona please"))
        .await;
    match opened {
        Err(ProviderError::HttpStatus { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API Key"));
        }
        Err(other) => panic!("expected http status error, got: {other}"),
        Ok(_) => panic!("stream should not open on 401"),
    }
}

#[test]
fn specs_resolve_to_known_providers() {
    let provider = provider_from_spec("groq/llama3-70b-8192", "gsk_key");
    assert!(provider.is_ok());
    if let Ok(provider) = provider {
        assert_eq!(provider.model_id(), "groq/llama3-70b-8192");
    }
    assert!(matches!(
        provider_from_spec("mistral/large", "key"),
        Err(ProviderError::Unavailable(_))
    ));
    assert!(matches!(
        provider_from_spec("groq/llama3-70b-8192", " "),
        Err(ProviderError::Unavailable(_))
    ));
}
