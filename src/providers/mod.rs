//! LLM provider abstraction layer.
//!
//! Defines the [`LlmProvider`] trait, the request type and the errors shared
//! by provider implementations.
//!
//! One wire format is implemented: [`openai::OpenAiCompatProvider`] speaks the
//! OpenAI `/chat/completions` API, which Groq and OpenAI both serve.
//! [`provider_from_spec`] turns a `"<provider>/<model>"` string into a
//! provider instance.

use std::pin::Pin;

use async_trait::async_trait;
use regex::Regex;
use tokio_stream::{Stream, StreamExt};

pub mod openai;

use openai::OpenAiCompatProvider;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// User prompt sent as the only message.
    pub prompt: String,
    /// Maximum tokens in the response.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// A request for `prompt` with the provider's default token limit.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
        }
    }
}

/// Incremental text deltas of a streamed completion.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by model providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// The event stream broke off or carried an error event.
    #[error("provider stream error: {0}")]
    Stream(String),
    /// Provider cannot satisfy the request with current configuration.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// HTTP helpers (useful for all providers)
// ---------------------------------------------------------------------------

/// Pass a successful response through, or read its body into a structured
/// error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await?;
    Err(ProviderError::HttpStatus {
        status: status.as_u16(),
        body: sanitize_http_error_body(&body),
    })
}

/// Collapse whitespace, redact token-like values and truncate an error body
/// so it can be logged or shown.
pub(crate) fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"gsk_[A-Za-z0-9]{20,}",
        r"sk-[A-Za-z0-9_\-]{20,}",
        r"(?i)bearer\s+[A-Za-z0-9._\-]{16,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A hosted model that streams generated text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request a completion as a stream of text deltas.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the stream cannot be opened. Failures
    /// after that arrive as stream items.
    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError>;

    /// The model identifier string this provider is instantiated for.
    fn model_id(&self) -> &str;
}

/// Drain a delta stream, handing every delta to `on_delta` as it arrives,
/// and return the full text.
///
/// # Errors
///
/// Returns the first error item of the stream.
pub async fn collect_stream<F>(mut stream: TextStream, mut on_delta: F) -> Result<String, ProviderError>
where
    F: FnMut(&str),
{
    let mut text = String::new();
    while let Some(delta) = stream.next().await {
        let delta = delta?;
        on_delta(&delta);
        text.push_str(&delta);
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Parse a provider string like `"groq/llama3-70b-8192"` into components.
///
/// Returns `(provider_name, model_name)`.
///
/// # Errors
///
/// Returns an error if the string has no `/` separator or either side is empty.
pub fn parse_provider_string(s: &str) -> anyhow::Result<(&str, &str)> {
    let (provider, model) = s.split_once('/').ok_or_else(|| {
        anyhow::anyhow!("invalid provider string: {s:?}, expected format 'provider/model'")
    })?;
    if provider.is_empty() || model.is_empty() {
        anyhow::bail!("invalid provider string: {s:?}, both provider and model must be non-empty");
    }
    Ok((provider, model))
}

/// Build a provider for a `"<provider>/<model>"` spec.
///
/// # Errors
///
/// Returns [`ProviderError::Unavailable`] for malformed specs, unknown
/// providers, or an empty API key.
pub fn provider_from_spec(spec: &str, api_key: &str) -> Result<OpenAiCompatProvider, ProviderError> {
    let (provider, model) =
        parse_provider_string(spec).map_err(|e| ProviderError::Unavailable(e.to_string()))?;
    let base_url = openai::base_url_for(provider)
        .ok_or_else(|| ProviderError::Unavailable(format!("unsupported provider '{provider}'")))?;
    if api_key.trim().is_empty() {
        return Err(ProviderError::Unavailable(format!(
            "missing API key for provider '{provider}'"
        )));
    }
    Ok(OpenAiCompatProvider::new(
        spec.to_owned(),
        model.to_owned(),
        api_key.to_owned(),
        base_url.to_owned(),
    ))
}
