//! Error types for tutorchat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for tutorchat operations
///
/// Covers configuration loading, credential resolution, inference API
/// failures, and session-level validation.
#[derive(Error, Debug)]
pub enum TutorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No API credential could be found in config, environment, or keyring
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Authentication errors (e.g., 401 Unauthorized)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The inference API rejected the request because of rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Provider-related errors (unexpected status codes, bad payloads)
    #[error("Provider error: {0}")]
    Provider(String),

    /// The response stream broke or carried an unreadable event
    #[error("Stream error: {0}")]
    Stream(String),

    /// The inference API stopped responding within the configured time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A message with no content was submitted
    #[error("Message content cannot be empty")]
    EmptyMessage,

    /// Model label, identifier, or index not present in the registry
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// No session with the given identifier exists
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A reply for this session is still being streamed
    #[error("A reply is still being streamed for this session")]
    ReplyInProgress,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for tutorchat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
