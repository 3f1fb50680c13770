//! Assembles the outgoing request payload from session state.

use crate::context::system_context;
use crate::types::{ChatMessage, ChatRequest, Message, ModelKey, TopicCatalog};

/// Composes the full `/chat` payload for the given history, model, and topic
/// selection.
///
/// One synthetic system turn (the topic context) is prepended ahead of the
/// conversation; the history itself is mapped in order and never mutated.
pub fn compose(
    history: &[Message],
    model: ModelKey,
    selected: &[String],
    catalog: &TopicCatalog,
) -> ChatRequest {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(system_context(selected, catalog)));
    messages.extend(history.iter().map(ChatMessage::from));

    ChatRequest {
        messages,
        model: model.backend_id().to_string(),
        selected_topics: selected.to_vec(),
    }
}
