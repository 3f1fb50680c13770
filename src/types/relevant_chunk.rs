use serde::{Deserialize, Serialize};

/// A fragment of source documentation that the backend's retriever judged
/// relevant to a question.
///
/// Scores are unbounded; higher means more relevant. Chunks are attached to
/// the assistant message that the question produced and are never mutated
/// afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevantChunk {
    /// The chunk text.
    pub text: String,

    /// The retrieval relevance score.
    pub score: f64,
}

impl RelevantChunk {
    /// Create a new `RelevantChunk` with the given text and score.
    pub fn new(text: impl Into<String>, score: f64) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}
