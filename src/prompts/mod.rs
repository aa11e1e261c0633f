//! System instruction and request assembly
//!
//! The tutor persona is injected at request time. Sessions only ever hold the
//! user/assistant exchange.

pub mod course_examples;
pub mod tutor_prompt;

pub use course_examples::{
    ExampleModule, ExamplePrompt, EXAMPLE_PROMPTS, WELCOME_QUESTION, WELCOME_SUGGESTIONS,
    WELCOME_TEXT,
};
pub use tutor_prompt::SYSTEM_INSTRUCTION;

use crate::session::Message;

/// Builds the outgoing message list for one request
///
/// The result always holds exactly one system message, in first position,
/// followed by the transcript unchanged.
///
/// # Examples
///
/// ```
/// use tutorchat::prompts::build_request_messages;
/// use tutorchat::session::{Message, Role};
///
/// let messages = build_request_messages(&[Message::user("Hola")]);
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// ```
pub fn build_request_messages(transcript: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(Message::system(SYSTEM_INSTRUCTION));
    messages.extend_from_slice(transcript);
    messages
}
