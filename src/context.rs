//! Builds the system-level instruction string from a topic selection.

use crate::types::TopicCatalog;

/// Instruction appended to every system context. The triple-backtick fence
/// is the contract the content classifier relies on to route code and file
/// content to the side panel.
pub const FENCE_INSTRUCTION: &str = "When providing code examples or file contents, \
wrap them in triple backticks (```). This will signal that the content should be \
displayed in a side panel.";

/// Instruction used when no topic scopes the conversation.
const GENERAL_INSTRUCTION: &str = "You are a general AI assistant.";

/// Builds the system context for a topic selection.
///
/// Each selected id is resolved to its label via the catalog; ids the
/// catalog does not know are silently dropped. A selection that resolves to
/// no labels at all behaves like an empty selection. The result is
/// deterministic for a given selection and catalog.
pub fn system_context(selected: &[String], catalog: &TopicCatalog) -> String {
    let labels: Vec<&str> = selected
        .iter()
        .filter_map(|id| catalog.get(id))
        .map(|topic| topic.label.as_str())
        .collect();

    let scope = if labels.is_empty() {
        GENERAL_INSTRUCTION.to_string()
    } else {
        format!(
            "You are an AI assistant specialized in: {}. Focus your responses on \
             these topics and related best practices.",
            labels.join(", ")
        )
    };

    format!("{scope}\n{FENCE_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Topic, TopicCatalog};

    fn catalog() -> TopicCatalog {
        TopicCatalog::new(vec![
            Topic::new("api-design", "API Design", "interface design"),
            Topic::new("testing", "Testing", "test strategy"),
        ])
    }

    #[test]
    fn empty_selection_yields_general_instruction() {
        let context = system_context(&[], &catalog());
        assert!(context.starts_with("You are a general AI assistant."));
        assert!(context.contains(FENCE_INSTRUCTION));
    }

    #[test]
    fn selection_embeds_resolved_labels() {
        let selected = vec!["api-design".to_string(), "testing".to_string()];
        let context = system_context(&selected, &catalog());
        assert!(context.contains("specialized in: API Design, Testing."));
        assert!(context.contains("related best practices"));
        assert!(context.contains(FENCE_INSTRUCTION));
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let selected = vec!["api-design".to_string(), "cooking".to_string()];
        let context = system_context(&selected, &catalog());
        assert!(context.contains("specialized in: API Design."));
        assert!(!context.contains("cooking"));
    }

    #[test]
    fn fully_unresolved_selection_falls_back_to_general() {
        let selected = vec!["cooking".to_string(), "juggling".to_string()];
        assert_eq!(system_context(&selected, &catalog()), system_context(&[], &catalog()));
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let selected = vec!["testing".to_string()];
        let a = system_context(&selected, &catalog());
        let b = system_context(&selected, &catalog());
        assert_eq!(a, b);
    }
}
