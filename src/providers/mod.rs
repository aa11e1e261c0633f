//! Provider module for tutorchat
//!
//! This module contains the inference API abstraction and its
//! OpenAI-compatible streaming implementation.

pub mod base;
pub mod openai_compat;
pub mod sse;

pub use base::{ChatRequest, FragmentStream, Provider};
pub use openai_compat::OpenAiCompatProvider;

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// Create the configured provider
///
/// Resolves the API credential as part of construction, so a missing key
/// surfaces here as `TutorError::MissingCredentials`.
///
/// # Errors
///
/// Returns error if no credential is available or the client cannot be built
pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let api_key = config.resolve_api_key()?;
    let provider = OpenAiCompatProvider::new(&config.provider, api_key)?;
    tracing::debug!("Using provider endpoint {}", provider.endpoint());
    Ok(Arc::new(provider))
}
