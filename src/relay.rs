//! Completion relay
//!
//! Wraps a [`Provider`] and exposes the one operation the front ends need:
//! turn a transcript into a lazy stream of reply fragments. Failures never
//! escape as errors. They become a single in-band fragment that starts with
//! [`ERROR_MARKER`], after which the stream ends.

use crate::error::TutorError;
use crate::prompts::build_request_messages;
use crate::providers::{ChatRequest, FragmentStream, Provider};
use crate::session::Message;

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// Sampling temperature for every request
pub const TEMPERATURE: f32 = 0.6;

/// Upper bound on generated tokens for every request
pub const MAX_TOKENS: u32 = 1024;

/// Prefix identifying a synthesized error fragment
pub const ERROR_MARKER: &str = "❌";

/// Reply fragments in arrival order
pub type ReplyStream = Pin<Box<dyn Stream<Item = String> + Send>>;

enum RelayState {
    Pending(Arc<dyn Provider>, ChatRequest),
    Streaming(FragmentStream),
    Done,
}

/// Streams tutor replies from an inference provider
///
/// # Examples
///
/// ```no_run
/// use tutorchat::relay::{collect_reply, CompletionRelay};
/// use tutorchat::session::Message;
/// # async fn example(relay: CompletionRelay) {
/// let stream = relay.stream_reply("llama-3.1-8b-instant", &[Message::user("Hola")]);
/// let reply = collect_reply(stream).await;
/// # }
/// ```
#[derive(Clone)]
pub struct CompletionRelay {
    provider: Arc<dyn Provider>,
}

impl CompletionRelay {
    /// Create a relay over a provider
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Build the request sent for a transcript
    ///
    /// The system instruction is prepended here and nowhere else.
    pub fn build_request(model: &str, transcript: &[Message]) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            messages: build_request_messages(transcript),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: true,
        }
    }

    /// Stream a reply to `transcript` from `model`
    ///
    /// Nothing is sent until the stream is first polled. The stream is finite
    /// and cannot be restarted. On failure it yields one fragment prefixed
    /// with [`ERROR_MARKER`] and then ends.
    pub fn stream_reply(&self, model: &str, transcript: &[Message]) -> ReplyStream {
        let request = Self::build_request(model, transcript);
        let initial = RelayState::Pending(Arc::clone(&self.provider), request);

        Box::pin(futures::stream::unfold(initial, |state| async move {
            let mut stream = match state {
                RelayState::Done => return None,
                RelayState::Streaming(stream) => stream,
                RelayState::Pending(provider, request) => {
                    tracing::info!(
                        provider = provider.name(),
                        model = %request.model,
                        "Requesting streamed reply"
                    );
                    match provider.stream_chat(&request).await {
                        Ok(stream) => stream,
                        Err(e) => return Some((error_fragment(&e), RelayState::Done)),
                    }
                }
            };

            loop {
                match stream.next().await {
                    Some(Ok(fragment)) if fragment.is_empty() => continue,
                    Some(Ok(fragment)) => return Some((fragment, RelayState::Streaming(stream))),
                    Some(Err(e)) => return Some((error_fragment(&e), RelayState::Done)),
                    None => {
                        tracing::debug!("Reply stream finished");
                        return None;
                    }
                }
            }
        }))
    }
}

/// Concatenate every fragment of a reply
pub async fn collect_reply<S>(stream: S) -> String
where
    S: Stream<Item = String>,
{
    stream
        .fold(String::new(), |mut acc, fragment| async move {
            acc.push_str(&fragment);
            acc
        })
        .await
}

/// Whether a fragment is a synthesized error
pub fn is_error_fragment(fragment: &str) -> bool {
    fragment.starts_with(ERROR_MARKER)
}

/// Render a failure as the single visible error fragment
fn error_fragment(err: &anyhow::Error) -> String {
    tracing::warn!("Reply stream failed: {:#}", err);
    format!(
        "{} Ups, hubo un error de conexión: {}",
        ERROR_MARKER,
        describe_failure(err)
    )
}

/// Kind-specific wording for a failure
fn describe_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TutorError>() {
        Some(TutorError::Authentication(msg)) => {
            format!("la clave de API fue rechazada ({})", msg)
        }
        Some(TutorError::RateLimited(msg)) => format!(
            "se alcanzó el límite de uso, probá de nuevo en unos segundos ({})",
            msg
        ),
        Some(TutorError::Timeout(_)) => "el servicio tardó demasiado en responder".to_string(),
        Some(TutorError::Http(e)) if e.is_timeout() => {
            "el servicio tardó demasiado en responder".to_string()
        }
        Some(TutorError::Http(e)) if e.is_connect() => {
            "no se pudo conectar con el servicio".to_string()
        }
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::SYSTEM_INSTRUCTION;
    use crate::session::Role;
    use crate::test_utils::ScriptedProvider;

    #[test]
    fn test_build_request_uses_fixed_parameters() {
        let request = CompletionRelay::build_request("gemma2-9b-it", &[Message::user("hola")]);
        assert_eq!(request.model, "gemma2-9b-it");
        assert_eq!(request.temperature, 0.6);
        assert_eq!(request.max_tokens, 1024);
        assert!(request.stream);
        assert_eq!(request.messages[0], Message::system(SYSTEM_INSTRUCTION));
    }

    #[tokio::test]
    async fn test_stream_reply_concatenates_fragments() {
        let provider = Arc::new(ScriptedProvider::fragments(&["Contexto", " + ", "Tarea"]));
        let relay = CompletionRelay::new(provider.clone());

        let reply = collect_reply(relay.stream_reply("m", &[Message::user("hola")])).await;

        assert_eq!(reply, "Contexto + Tarea");
        assert!(!is_error_fragment(&reply));
    }

    #[tokio::test]
    async fn test_stream_reply_sends_one_system_message() {
        let provider = Arc::new(ScriptedProvider::fragments(&["ok"]));
        let relay = CompletionRelay::new(provider.clone());
        let transcript = vec![
            Message::user("a"),
            Message::assistant("b"),
            Message::user("c"),
        ];

        let _ = collect_reply(relay.stream_reply("m", &transcript)).await;

        let sent = provider.last_request().expect("request recorded");
        assert_eq!(sent.messages.len(), 4);
        assert_eq!(sent.messages[0].role, Role::System);
        assert_eq!(
            sent.messages.iter().filter(|m| m.role == Role::System).count(),
            1
        );
        assert_eq!(&sent.messages[1..], transcript.as_slice());
    }

    #[tokio::test]
    async fn test_stream_reply_is_lazy() {
        let provider = Arc::new(ScriptedProvider::fragments(&["ok"]));
        let relay = CompletionRelay::new(provider.clone());
        let stream = relay.stream_reply("m", &[Message::user("hola")]);
        assert!(provider.last_request().is_none());
        drop(stream);
        assert!(provider.last_request().is_none());
    }

    #[tokio::test]
    async fn test_connect_failure_yields_single_error_fragment() {
        let provider = Arc::new(ScriptedProvider::failing(TutorError::Authentication(
            "Invalid API Key".to_string(),
        )));
        let relay = CompletionRelay::new(provider);

        let fragments: Vec<String> = relay
            .stream_reply("m", &[Message::user("hola")])
            .collect()
            .await;

        assert_eq!(fragments.len(), 1);
        assert!(is_error_fragment(&fragments[0]));
        assert!(fragments[0].contains("clave de API"));
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_prior_fragments_then_ends() {
        let provider = Arc::new(ScriptedProvider::broken_after(
            &["Confiar", " pero"],
            TutorError::Stream("connection reset".to_string()),
        ));
        let relay = CompletionRelay::new(provider);

        let fragments: Vec<String> = relay
            .stream_reply("m", &[Message::user("hola")])
            .collect()
            .await;

        assert_eq!(fragments.len(), 3);
        assert_eq!(&fragments[..2], &["Confiar".to_string(), " pero".to_string()]);
        assert!(is_error_fragment(&fragments[2]));
        assert!(fragments[2].contains("connection reset"));
    }

    #[tokio::test]
    async fn test_empty_fragments_are_skipped() {
        let provider = Arc::new(ScriptedProvider::fragments(&["", "Hola", ""]));
        let relay = CompletionRelay::new(provider);
        let fragments: Vec<String> = relay.stream_reply("m", &[]).collect().await;
        assert_eq!(fragments, vec!["Hola".to_string()]);
    }

    #[tokio::test]
    async fn test_mid_stream_timeout_uses_timeout_wording() {
        let provider = Arc::new(ScriptedProvider::broken_after(
            &["Hola"],
            TutorError::Timeout("no data received for 60s".to_string()),
        ));
        let relay = CompletionRelay::new(provider);

        let fragments: Vec<String> = relay
            .stream_reply("m", &[Message::user("hola")])
            .collect()
            .await;

        assert_eq!(fragments.len(), 2);
        assert!(is_error_fragment(&fragments[1]));
        assert!(fragments[1].contains("tardó demasiado"));
    }

    #[test]
    fn test_rate_limit_wording() {
        let err: anyhow::Error = TutorError::RateLimited("wait".to_string()).into();
        let fragment = error_fragment(&err);
        assert!(fragment.starts_with(ERROR_MARKER));
        assert!(fragment.contains("límite de uso"));
    }
}
