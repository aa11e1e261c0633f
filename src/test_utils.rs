//! Test utilities for tutorchat
//!
//! Provides a scripted in-memory [`Provider`] so relay, command, and server
//! logic can be exercised without network access.

use crate::error::{Result, TutorError};
use crate::providers::{ChatRequest, FragmentStream, Provider};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

enum Script {
    Fragments(Vec<String>),
    Fail(TutorError),
    BrokenAfter(Vec<String>, TutorError),
    Gated(Vec<String>, Arc<Notify>),
}

/// Provider that replays a fixed script and records what it was sent
pub struct ScriptedProvider {
    script: Mutex<Option<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    fn with_script(script: Script) -> Self {
        Self {
            script: Mutex::new(Some(script)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stream the given fragments, then finish
    pub fn fragments(parts: &[&str]) -> Self {
        Self::with_script(Script::Fragments(
            parts.iter().map(|p| p.to_string()).collect(),
        ))
    }

    /// Reject the request before any fragment is produced
    pub fn failing(error: TutorError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    /// Stream the given fragments, then break with `error`
    pub fn broken_after(parts: &[&str], error: TutorError) -> Self {
        Self::with_script(Script::BrokenAfter(
            parts.iter().map(|p| p.to_string()).collect(),
            error,
        ))
    }

    /// Stream the given fragments once the returned gate is notified
    pub fn gated(parts: &[&str]) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let provider = Self::with_script(Script::Gated(
            parts.iter().map(|p| p.to_string()).collect(),
            Arc::clone(&gate),
        ));
        (provider, gate)
    }

    /// The most recent request, if any was made
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn stream_chat(&self, request: &ChatRequest) -> Result<FragmentStream> {
        self.requests.lock().unwrap().push(request.clone());

        let script = self
            .script
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Script::Fail(TutorError::Provider("script exhausted".to_string())));

        let items: Vec<Result<String>> = match script {
            Script::Fragments(parts) => parts.into_iter().map(Ok).collect(),
            Script::Fail(error) => return Err(error.into()),
            Script::BrokenAfter(parts, error) => parts
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(error.into())))
                .collect(),
            Script::Gated(parts, gate) => {
                let released = futures::stream::once(async move { gate.notified().await });
                return Ok(Box::pin(released.flat_map(move |_| {
                    let items = parts.clone().into_iter().map(Ok::<String, anyhow::Error>);
                    futures::stream::iter(items)
                })));
            }
        };
        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
