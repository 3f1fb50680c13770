//! Slash command parsing for the chat REPL.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the session without sending messages to the
//! backend.

/// A parsed chat command.
///
/// These commands control the session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation (local log and server-side session).
    Clear,

    /// Change the model key.
    Model(String),

    /// Replace the topic selection.
    Topics(Vec<String>),

    /// List the topic catalog.
    ListTopics,

    /// Ask a single question against the retrieval backend.
    Ask(String),

    /// Show the current side-panel content.
    Panel,

    /// Close the side panel.
    ClosePanel,

    /// Display session statistics (message count, current model, etc.).
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use docent::session::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/topics api-design,testing").is_some());
/// assert!(parse_command("How do generics work?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model key".to_string()),
        },
        "topics" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("list") => ChatCommand::ListTopics,
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::Topics(Vec::new()),
            Some(arg) => ChatCommand::Topics(
                arg.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
            ),
            None => ChatCommand::ListTopics,
        },
        "ask" => match argument {
            Some(question) => ChatCommand::Ask(question.to_string()),
            None => ChatCommand::Invalid("/ask requires a question".to_string()),
        },
        "panel" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("close") => ChatCommand::ClosePanel,
            Some(_) => ChatCommand::Invalid("/panel takes no argument or 'close'".to_string()),
            None => ChatCommand::Panel,
        },
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history (local and server)
  /model <key>           Change the model (fast or accurate)
  /topics <ids,...>      Scope the conversation to topic ids
  /topics clear          Remove the topic scope
  /topics list           List the topic catalog
  /ask <question>        One-shot question against the retrieval backend
  /panel                 Show the side-panel content
  /panel close           Close the side panel
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
