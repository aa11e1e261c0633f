//! OpenAI-compatible chat-completions provider
//!
//! Speaks the `/chat/completions` streaming dialect shared by Groq, OpenAI and
//! most hosted inference services: a JSON POST with `stream: true`, answered
//! by an SSE body whose events carry `choices[0].delta.content` and end with
//! `data: [DONE]`.

use crate::config::ProviderConfig;
use crate::error::{Result, TutorError};
use crate::providers::sse::parse_sse_stream;
use crate::providers::{ChatRequest, FragmentStream, Provider};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{future, Stream, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Streaming chat-completions client
///
/// # Examples
///
/// ```no_run
/// use tutorchat::config::ProviderConfig;
/// use tutorchat::providers::OpenAiCompatProvider;
///
/// let provider = OpenAiCompatProvider::new(&ProviderConfig::default(), "gsk_...".to_string());
/// assert!(provider.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct OpenAiCompatProvider {
    client: Client,
    api_base: String,
    api_key: String,
    timeout: Duration,
}

/// One streamed chunk of a chat completion
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope used both in HTTP error bodies and in-stream error events
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

impl OpenAiCompatProvider {
    /// Create a new provider
    ///
    /// `timeout_seconds` bounds connecting, waiting for the response headers,
    /// and each gap between body chunks. A long reply that keeps streaming is
    /// never cut off.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .connect_timeout(timeout)
            .user_agent(concat!("tutorchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TutorError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }

    /// Full URL of the chat-completions endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    async fn stream_chat(&self, request: &ChatRequest) -> Result<FragmentStream> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let send = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(request)
            .send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| {
                TutorError::Timeout(format!(
                    "no response within {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(TutorError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Chat completion request rejected");
            return Err(format_api_error(status, &body).into());
        }

        let chunks = with_idle_timeout(response.bytes_stream(), self.timeout);
        Ok(Box::pin(decode_fragments(parse_sse_stream(chunks))))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

/// Fail the body stream if no chunk arrives within `idle`
fn with_idle_timeout<S>(
    chunks: S,
    idle: Duration,
) -> impl Stream<Item = std::result::Result<Bytes, TutorError>> + Send
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send,
{
    tokio_stream::StreamExt::timeout(chunks, idle).map(move |item| match item {
        Ok(Ok(chunk)) => Ok(chunk),
        Ok(Err(e)) => Err(TutorError::Http(e)),
        Err(_) => Err(TutorError::Timeout(format!(
            "no data received for {}s",
            idle.as_secs()
        ))),
    })
}

/// Map event payloads to text fragments, stopping at `[DONE]`
fn decode_fragments<S>(events: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = Result<String>> + Send,
{
    events
        .take_while(|item| future::ready(!matches!(item, Ok(data) if data.trim() == "[DONE]")))
        .filter_map(|item| {
            future::ready(match item {
                Ok(data) => parse_chunk(&data).transpose(),
                Err(e) => Some(Err(e)),
            })
        })
}

/// Decode one event payload into its text delta
///
/// Returns `Ok(None)` for chunks with no text (role announcements, usage
/// trailers, empty deltas).
fn parse_chunk(data: &str) -> Result<Option<String>> {
    let chunk: ChatCompletionChunk = serde_json::from_str(data)
        .map_err(|e| TutorError::Stream(format!("invalid completion chunk: {}", e)))?;

    if let Some(err) = chunk.error {
        return Err(TutorError::Provider(
            err.message
                .unwrap_or_else(|| "error event in completion stream".to_string()),
        )
        .into());
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|text| !text.is_empty()))
}

/// Convert a non-success HTTP response into a typed error
fn format_api_error(status: StatusCode, body: &str) -> TutorError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|r| r.error.message)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TutorError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => TutorError::RateLimited(message),
        _ => TutorError::Provider(format!("API returned {}: {}", status, message)),
    }
}
