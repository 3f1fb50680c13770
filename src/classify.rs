//! Decides whether a completed assistant message belongs in the side panel.

/// Transcript stand-in text for a message promoted to the side panel.
pub const PANEL_PLACEHOLDER: &str = "Content shown in side panel.";

/// The triple-backtick delimiter the system prompt asks the model to use for
/// code and file content.
const FENCE: &str = "```";

/// The outcome of classifying a completed assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// True if the message should be routed to the side panel.
    pub has_side_panel_content: bool,

    /// The side-panel content. When a fence is detected this is the entire
    /// message, so the explanation surrounding the fenced block is kept.
    pub panel_content: String,
}

/// Classifies a completed assistant message.
///
/// A message is promoted to the side panel when it holds at least one
/// balanced pair of triple-backtick fences. An odd fence count means an
/// unterminated block, which only occurs on streaming partials; those
/// classify false, so classification must run on final content only.
/// Absence of fences is a normal outcome, not an error.
pub fn classify(content: &str) -> Classification {
    let fences = count_fences(content);
    if fences >= 2 && fences % 2 == 0 {
        Classification {
            has_side_panel_content: true,
            panel_content: content.to_string(),
        }
    } else {
        Classification {
            has_side_panel_content: false,
            panel_content: String::new(),
        }
    }
}

/// Counts non-overlapping occurrences of the fence delimiter.
fn count_fences(content: &str) -> usize {
    let mut count = 0;
    let mut rest = content;
    while let Some(pos) = rest.find(FENCE) {
        count += 1;
        rest = &rest[pos + FENCE.len()..];
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_fences_is_plain_transcript_content() {
        let result = classify("Generics erase at runtime.");
        assert!(!result.has_side_panel_content);
        assert!(result.panel_content.is_empty());
    }

    #[test]
    fn balanced_fences_promote_whole_message() {
        let content = "Here is an example:\n```java\nint x = 1;\n```\nThat is all.";
        let result = classify(content);
        assert!(result.has_side_panel_content);
        assert_eq!(result.panel_content, content);
    }

    #[test]
    fn minimal_fenced_answer() {
        let result = classify("```print(1)```");
        assert!(result.has_side_panel_content);
        assert_eq!(result.panel_content, "```print(1)```");
    }

    #[test]
    fn unterminated_fence_is_streaming_partial() {
        let result = classify("Partial answer so far:\n```java\nint x =");
        assert!(!result.has_side_panel_content);
    }

    #[test]
    fn multiple_balanced_blocks() {
        let content = "```a```\nand\n```b```";
        assert!(classify(content).has_side_panel_content);
    }

    #[test]
    fn three_fences_do_not_promote() {
        let content = "```a```\ntrailing\n```";
        assert!(!classify(content).has_side_panel_content);
    }

    #[test]
    fn empty_content() {
        assert!(!classify("").has_side_panel_content);
    }
}
