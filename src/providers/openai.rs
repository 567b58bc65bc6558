//! OpenAI-compatible provider using the `/chat/completions` API.
//!
//! Serves both Groq (`https://api.groq.com/openai/v1`) and OpenAI. Streamed
//! responses are server-sent events whose `data:` payloads carry
//! `choices[0].delta.content`, terminated by `[DONE]`.

use eventsource_stream::Eventsource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_stream::StreamExt;
use tracing::debug;

use super::{
    ensure_success, sanitize_http_error_body, CompletionRequest, LlmProvider, ProviderError,
    TextStream,
};

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// API base URL for a known provider name.
pub fn base_url_for(provider: &str) -> Option<&'static str> {
    match provider {
        "groq" => Some(GROQ_API_BASE),
        "openai" => Some(OPENAI_API_BASE),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Chat completions request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Maximum completion tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Whether to stream the response as server-sent events.
    pub stream: bool,
}

/// A message in chat completions format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    /// Role; always `user` here.
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// One streamed chunk.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    /// Delta choices; empty on usage-only chunks.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Error object some servers send mid-stream.
    pub error: Option<Value>,
}

/// A streamed choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    /// Incremental content.
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// Incremental message content.
#[doc(hidden)]
#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    /// Text appended by this chunk.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Chat completions provider for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    model_spec: String,
    model_name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("model_spec", &self.model_spec)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiCompatProvider {
    /// Create a provider instance.
    pub fn new(model_spec: String, model_name: String, api_key: String, base_url: String) -> Self {
        Self {
            model_spec,
            model_name,
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{CHAT_COMPLETIONS_PATH}", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Request builder and stream parsing (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build a streamed chat completions request holding `request.prompt` as
/// the single user message.
#[doc(hidden)]
pub fn build_request(model: &str, request: &CompletionRequest) -> ChatRequest {
    ChatRequest {
        model: model.to_owned(),
        messages: vec![ChatMessage {
            role: "user".to_owned(),
            content: request.prompt.clone(),
        }],
        max_tokens: Some(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
        stream: true,
    }
}

/// Parse the `data:` payload of one stream event.
///
/// Returns `Ok(None)` for the `[DONE]` sentinel, keep-alives and chunks
/// without text.
///
/// # Errors
///
/// Returns `ProviderError::Parse` for malformed JSON and
/// `ProviderError::Stream` for error events.
#[doc(hidden)]
pub fn parse_stream_data(data: &str) -> Result<Option<String>, ProviderError> {
    let trimmed = data.trim();
    if trimmed.is_empty() || trimmed == "[DONE]" {
        return Ok(None);
    }

    let chunk: ChatChunk = serde_json::from_str(trimmed)
        .map_err(|e| ProviderError::Parse(format!("failed to parse stream chunk: {e}")))?;

    if let Some(error) = chunk.error {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_owned);
        return Err(ProviderError::Stream(sanitize_http_error_body(&message)));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty()))
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError> {
        let api_request = build_request(&self.model_name, &request);
        debug!(model = %self.model_name, "sending chat completion request");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&api_request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let deltas = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| match event {
                Ok(event) => parse_stream_data(&event.data).transpose(),
                Err(err) => Some(Err(ProviderError::Stream(err.to_string()))),
            });
        Ok(Box::pin(deltas))
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
