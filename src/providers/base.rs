//! Base provider trait and request types for tutorchat
//!
//! This module defines the Provider trait that the inference API client
//! implements, along with the chat-completion request body.

use crate::error::Result;
use crate::session::Message;
use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

/// Lazily produced reply fragments, or the error that ended the stream
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Chat-completion request body
///
/// Serializes to `{model, messages, temperature, max_tokens, stream}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Provider model identifier
    pub model: String,
    /// Full message list, system instruction included
    pub messages: Vec<Message>,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Whether the reply is streamed as server-sent events
    pub stream: bool,
}

/// Provider trait for inference APIs
///
/// # Examples
///
/// ```no_run
/// use tutorchat::providers::{ChatRequest, FragmentStream, Provider};
/// use tutorchat::error::Result;
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Provider for Echo {
///     async fn stream_chat(&self, request: &ChatRequest) -> Result<FragmentStream> {
///         let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
///         Ok(Box::pin(futures::stream::iter(vec![Ok(last)])))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Starts a streaming completion
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the API rejects it.
    /// Failures after the stream has started arrive as `Err` items.
    async fn stream_chat(&self, request: &ChatRequest) -> Result<FragmentStream>;

    /// Short provider name used in logs
    fn name(&self) -> &str {
        "provider"
    }
}
