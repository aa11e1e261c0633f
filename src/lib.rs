//! tutorchat - course tutor chat library
//!
//! This library provides the core of the "IA para Todos" tutor: a
//! per-session transcript, a streaming relay to an OpenAI-compatible
//! completion API, and the front ends that drive them.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Transcript and active model for one session
//! - `relay`: Streams reply fragments, turning failures into in-band text
//! - `providers`: Inference API abstraction and the OpenAI-compatible client
//! - `registry`: Static label → model identifier table
//! - `prompts`: Tutor system instruction and course examples
//! - `server`: HTTP API with one explicit session context per client
//! - `commands`: Terminal chat and other CLI handlers
//! - `config`: Configuration management and credential resolution
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use tutorchat::{CompletionRelay, Config, Message, SessionStore};
//! use tutorchat::relay::collect_reply;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let relay = CompletionRelay::new(tutorchat::providers::create_provider(&config)?);
//!     let mut session = SessionStore::new();
//!     session.append(Message::user("¿Cómo escribo un buen prompt?"))?;
//!     let reply = collect_reply(relay.stream_reply(session.active_model(), session.messages())).await;
//!     session.append(Message::assistant(reply))?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TutorError};
pub use registry::ModelRegistry;
pub use relay::CompletionRelay;
pub use session::{Message, Role, SessionStore};

#[cfg(test)]
pub mod test_utils;
