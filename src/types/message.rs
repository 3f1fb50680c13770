use serde::{Deserialize, Serialize};

use crate::types::RelevantChunk;

/// Role type for a conversation message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System role. Only the request composer produces system turns; the
    /// session log itself holds user and assistant messages.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// A single message in a chat session.
///
/// Messages are created and owned by the session controller. They are
/// immutable once appended, except that an in-progress assistant message's
/// `content` grows while a streamed response arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque unique identifier, minted by the session controller.
    pub id: String,

    /// The role of the message.
    pub role: MessageRole,

    /// The message text.
    pub content: String,

    /// Retrieval chunks attached to the assistant message that produced
    /// them. Empty for backends that do not perform retrieval.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relevant_chunks: Vec<RelevantChunk>,

    /// True if a streamed response failed before completing; the partial
    /// content is kept.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub incomplete: bool,
}

impl Message {
    /// Create a new `Message` with the given id, role, and content.
    pub fn new(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            relevant_chunks: Vec::new(),
            incomplete: false,
        }
    }

    /// Create a new user `Message`.
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::Assistant, content)
    }

    /// Attach retrieval chunks to this message.
    pub fn with_relevant_chunks(mut self, chunks: Vec<RelevantChunk>) -> Self {
        self.relevant_chunks = chunks;
        self
    }
}
