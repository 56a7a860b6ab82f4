//! Message and Conversation domain types.
//!
//! User types a line → it becomes a `user` message → the agent sends the
//! whole conversation to the provider → replies and tool observations are
//! appended behind it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::Envelope;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instruction prompt
    System,
    /// The person at the terminal
    User,
    /// The language model
    Assistant,
    /// Tool observations fed back to the model
    Developer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Developer => "developer",
        }
    }
}

/// A single message in a conversation.
///
/// Fields are private so a message cannot change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Create the system message carrying the instruction prompt.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message wrapping the typed line in a `user` envelope.
    pub fn user(text: impl Into<String>) -> Self {
        Self::from_envelope(Role::User, &Envelope::User { user: text.into() })
    }

    /// Create an assistant message from a parsed model reply.
    pub fn assistant(envelope: &Envelope) -> Self {
        Self::from_envelope(Role::Assistant, envelope)
    }

    /// Create a developer message carrying a tool observation.
    pub fn observation(observation: serde_json::Value) -> Self {
        Self::from_envelope(Role::Developer, &Envelope::Observation { observation })
    }

    fn from_envelope(role: Role, envelope: &Envelope) -> Self {
        Self {
            role,
            content: envelope.to_content(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// An append-only, ordered sequence of messages shared with the model.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Start a conversation seeded with the instruction prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: vec![Message::system(system_prompt)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message to the end of the conversation.
    pub fn append(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// The full ordered history.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
