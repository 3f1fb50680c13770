//! Configuration types for the chat session.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling session behavior.

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_BASE_URL;
use crate::types::ModelKey;

/// Command-line arguments for the docent-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct SessionArgs {
    /// Backend base URL.
    #[arrrg(optional, "Backend base URL (default: http://localhost:8000)", "URL")]
    pub base_url: Option<String>,

    /// Model key to use for chat.
    #[arrrg(optional, "Model to use: fast or accurate (default: fast)", "MODEL")]
    pub model: Option<String>,

    /// Comma-separated topic ids to scope the conversation.
    #[arrrg(optional, "Comma-separated topic ids to focus on", "TOPICS")]
    pub topics: Option<String>,

    /// Use the buffered transport instead of streaming.
    #[arrrg(flag, "Wait for complete responses instead of streaming")]
    pub buffered: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend base URL.
    pub base_url: String,

    /// The model key used for responses.
    pub model: ModelKey,

    /// Selected topic ids; unknown ids are dropped at compose time.
    pub selected_topics: Vec<String>,

    /// Whether responses stream incrementally or arrive buffered.
    pub streaming: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl SessionConfig {
    /// Creates a new SessionConfig with default values.
    ///
    /// Defaults: local backend, fast model, no topic scope, streaming on,
    /// color on.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: ModelKey::default(),
            selected_topics: Vec::new(),
            streaming: true,
            use_color: true,
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model key.
    pub fn with_model(mut self, model: ModelKey) -> Self {
        self.model = model;
        self
    }

    /// Sets the topic selection.
    pub fn with_selected_topics(mut self, topics: Vec<String>) -> Self {
        self.selected_topics = topics;
        self
    }

    /// Enables or disables streaming responses.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SessionArgs> for SessionConfig {
    fn from(args: SessionArgs) -> Self {
        let model = args
            .model
            .map(|s| s.parse::<ModelKey>().unwrap_or_default())
            .unwrap_or_default();
        let selected_topics = args
            .topics
            .map(|s| {
                s.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        SessionConfig {
            base_url: args
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            selected_topics,
            streaming: !args.buffered,
            use_color: !args.no_color,
        }
    }
}
