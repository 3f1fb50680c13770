use serde::{Deserialize, Serialize};

use crate::types::{Message, MessageRole, RelevantChunk};

/// Request body for the single-question retrieval endpoint (`POST /api/ask`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The user's question.
    pub question: String,
}

impl AskRequest {
    /// Create a new `AskRequest`.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Response body for the retrieval endpoint, also used as the uniform
/// buffered-reply shape across transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    /// The assistant's answer.
    pub answer: String,

    /// Retrieval chunks that informed the answer, highest-scoring first.
    #[serde(default)]
    pub relevant_chunks: Vec<RelevantChunk>,
}

impl AskResponse {
    /// Create a new `AskResponse` with no retrieval chunks.
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            relevant_chunks: Vec::new(),
        }
    }

    /// Attach retrieval chunks.
    pub fn with_relevant_chunks(mut self, chunks: Vec<RelevantChunk>) -> Self {
        self.relevant_chunks = chunks;
        self
    }
}

/// One turn of the conversation in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the turn.
    pub role: MessageRole,

    /// The turn text.
    pub content: String,
}

impl ChatMessage {
    /// Create a new `ChatMessage`.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system `ChatMessage`.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self::new(message.role, message.content.clone())
    }
}

/// Request body for the multi-turn, topic-scoped endpoint (`POST /chat`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The full conversation, system context first, in chronological order.
    pub messages: Vec<ChatMessage>,

    /// Backend model identifier.
    pub model: String,

    /// Selected topic ids, forwarded for server-side bookkeeping.
    #[serde(rename = "selectedTopics")]
    pub selected_topics: Vec<String>,
}

/// Response body for the buffered variant of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's complete response text.
    pub response: String,
}
