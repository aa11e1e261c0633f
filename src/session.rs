//! Per-session conversation state
//!
//! A [`SessionStore`] holds the ordered transcript for one student and the
//! model identifier currently selected. It is append-only: messages are never
//! edited or removed individually, only cleared all at once.

use crate::error::{Result, TutorError};
use crate::registry::ModelRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student
    User,
    /// The model
    Assistant,
    /// Fixed instruction injected per request
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// A single chat message
///
/// Serializes to the `{role, content}` shape the completion API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Text of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use tutorchat::session::{Message, Role};
    ///
    /// let msg = Message::user("Hola");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Transcript and model selection for one session
///
/// # Examples
///
/// ```
/// use tutorchat::session::{Message, SessionStore};
///
/// let mut store = SessionStore::new();
/// store.append(Message::user("¿Qué es un prompt?")).unwrap();
/// store.set_model("gemma2-9b-it");
/// assert_eq!(store.len(), 1);
/// assert_eq!(store.active_model(), "gemma2-9b-it");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStore {
    messages: Vec<Message>,
    active_model: String,
    started_at: DateTime<Utc>,
    #[serde(skip)]
    generation: u64,
    #[serde(skip)]
    reply_pending: bool,
}

impl SessionStore {
    /// Creates an empty session using the registry's default model
    pub fn new() -> Self {
        Self::with_model(ModelRegistry::default_model())
    }

    /// Creates an empty session with a specific active model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            active_model: model.into(),
            started_at: Utc::now(),
            generation: 0,
            reply_pending: false,
        }
    }

    /// Appends a message to the end of the transcript
    ///
    /// # Errors
    ///
    /// Returns `TutorError::EmptyMessage` if the content is blank.
    pub fn append(&mut self, message: Message) -> Result<()> {
        if message.content.trim().is_empty() {
            return Err(TutorError::EmptyMessage.into());
        }
        tracing::debug!(
            role = %message.role,
            position = self.messages.len(),
            "Appending message to session"
        );
        self.messages.push(message);
        Ok(())
    }

    /// Removes every message; the active model is kept
    ///
    /// A reply still streaming for the old transcript is discarded when it
    /// finishes, and a new turn may start right away.
    pub fn clear(&mut self) {
        tracing::debug!(dropped = self.messages.len(), "Clearing session transcript");
        self.messages.clear();
        self.generation += 1;
        self.reply_pending = false;
    }

    /// Appends the user's message and marks a reply as pending
    ///
    /// Returns the transcript generation the reply belongs to; pass it back
    /// to [`SessionStore::finish_turn`].
    ///
    /// # Errors
    ///
    /// Returns `TutorError::ReplyInProgress` if the previous reply has not
    /// finished, or `TutorError::EmptyMessage` if the content is blank.
    /// The transcript is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tutorchat::session::{Message, SessionStore};
    ///
    /// let mut store = SessionStore::new();
    /// let turn = store.start_turn(Message::user("Hola")).unwrap();
    /// assert!(store.start_turn(Message::user("¿Hola?")).is_err());
    /// assert!(store.finish_turn(turn, "¡Hola!".to_string()));
    /// assert_eq!(store.len(), 2);
    /// ```
    pub fn start_turn(&mut self, message: Message) -> Result<u64> {
        if self.reply_pending {
            return Err(TutorError::ReplyInProgress.into());
        }
        self.append(message)?;
        self.reply_pending = true;
        Ok(self.generation)
    }

    /// Stores the reply for a turn started with [`SessionStore::start_turn`]
    ///
    /// The reply is dropped if the transcript was cleared since the turn
    /// started, or if it is blank. Returns whether it was stored.
    pub fn finish_turn(&mut self, generation: u64, reply: String) -> bool {
        if generation != self.generation {
            tracing::debug!(
                turn = generation,
                current = self.generation,
                "Dropping reply for a cleared transcript"
            );
            return false;
        }
        self.reply_pending = false;

        if reply.trim().is_empty() {
            tracing::warn!("Model returned an empty reply; nothing stored");
            return false;
        }
        self.messages.push(Message::assistant(reply));
        true
    }

    /// Whether a reply is still being streamed for this transcript
    pub fn reply_pending(&self) -> bool {
        self.reply_pending
    }

    /// Replaces the active model; the transcript is kept
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.active_model = model.into();
        tracing::debug!(model = %self.active_model, "Active model changed");
    }

    /// The transcript in chronological order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Identifier of the selected model
    pub fn active_model(&self) -> &str {
        &self.active_model
    }

    /// When the session was opened; unaffected by `clear`
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of messages in the transcript
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
