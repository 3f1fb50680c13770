//! Core session state management.
//!
//! This module provides the [`SessionController`], which owns the ordered
//! message log, the pending-input draft, the loading/error flags, and the
//! side panel, and orchestrates submit, receive, classify, and clear.
//!
//! The controller is a plain state container: the primitive commands
//! (`begin_submit`, `apply_buffered`, `apply_fragment`, `finish_stream`,
//! `fail_stream`, `clear`) mutate state synchronously and carry a session
//! generation stamp, so a driver that interleaves a `clear` with an
//! outstanding request cannot have the stale result applied. The async
//! `send_*` methods are convenience drivers that pair a command phase with a
//! transport call for single-task use.

use futures::StreamExt;

use crate::classify::classify;
use crate::client::ChatTransport;
use crate::compose::compose;
use crate::error::Error;
use crate::observability;
use crate::render::Renderer;
use crate::session::config::SessionConfig;
use crate::types::{AskResponse, ChatRequest, Message, ModelKey, TopicCatalog};

/// The lifecycle phase of the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// No request outstanding; input is accepted.
    Idle,

    /// A request has been sent; no response content has arrived yet.
    AwaitingResponse,

    /// Fragments of a streamed response are arriving.
    Streaming,

    /// The last request failed; input is accepted and the error is visible.
    Error,
}

/// The auxiliary display surface for code and file content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidePanel {
    /// Whether the panel is visible.
    pub is_open: bool,

    /// The panel content. Closing the panel does not discard it.
    pub content: String,
}

/// A submitted request awaiting its result.
///
/// The generation stamp ties the eventual result back to the session state
/// that produced it; results from a generation that has since been cleared
/// are discarded.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    generation: u64,
    payload: ChatRequest,
}

impl PendingRequest {
    /// The session generation this request belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The composed request payload.
    pub fn payload(&self) -> &ChatRequest {
        &self.payload
    }

    /// Consumes the pending request, returning the payload.
    pub fn into_payload(self) -> ChatRequest {
        self.payload
    }
}

/// Aggregated stats for a session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model key used for the session.
    pub model: ModelKey,

    /// The number of messages in the conversation.
    pub message_count: usize,

    /// The selected topic ids.
    pub selected_topics: Vec<String>,

    /// Whether the side panel is open.
    pub panel_open: bool,

    /// Whether responses stream incrementally.
    pub streaming: bool,
}

/// A chat session that owns conversation state and orchestrates the
/// request/response cycle.
pub struct SessionController {
    config: SessionConfig,
    catalog: TopicCatalog,
    messages: Vec<Message>,
    draft: String,
    phase: SessionPhase,
    error: Option<Error>,
    side_panel: SidePanel,
    generation: u64,
    next_message_id: u64,
}

impl SessionController {
    /// Creates a new, empty session with the given configuration and topic
    /// catalog.
    pub fn new(config: SessionConfig, catalog: TopicCatalog) -> Self {
        Self {
            config,
            catalog,
            messages: Vec::new(),
            draft: String::new(),
            phase: SessionPhase::Idle,
            error: None,
            side_panel: SidePanel::default(),
            generation: 0,
            next_message_id: 0,
        }
    }

    /// The ordered message log, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The current draft input text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the draft input text.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True while a request is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::AwaitingResponse | SessionPhase::Streaming
        )
    }

    /// The last failure, if the session is in the error phase.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The side panel state.
    pub fn side_panel(&self) -> &SidePanel {
        &self.side_panel
    }

    /// The current model key.
    pub fn model(&self) -> ModelKey {
        self.config.model
    }

    /// Changes the model used for subsequent requests.
    pub fn set_model(&mut self, model: ModelKey) {
        self.config.model = model;
    }

    /// The selected topic ids.
    pub fn selected_topics(&self) -> &[String] {
        &self.config.selected_topics
    }

    /// Replaces the topic selection. Ids the catalog does not know are kept
    /// here but silently dropped when the system context is built.
    pub fn set_selected_topics(&mut self, topics: Vec<String>) {
        self.config.selected_topics = topics;
    }

    /// The topic catalog this session resolves selections against.
    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model,
            message_count: self.message_count(),
            selected_topics: self.config.selected_topics.clone(),
            panel_open: self.side_panel.is_open,
            streaming: self.config.streaming,
        }
    }

    fn mint_message_id(&mut self) -> String {
        self.next_message_id += 1;
        format!("msg-{}", self.next_message_id)
    }

    /// Begins a submission: appends exactly one user message, clears the
    /// draft, and composes the outgoing payload.
    ///
    /// Returns `None` when the trimmed text is empty or a request is already
    /// outstanding; a submit from the error phase is allowed (the user may
    /// retry after a failure).
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingRequest> {
        let text = text.trim();
        if text.is_empty() || self.is_loading() {
            return None;
        }
        observability::SESSION_SUBMITS.click();

        let id = self.mint_message_id();
        self.messages.push(Message::user(id, text));
        self.draft.clear();
        self.error = None;
        self.phase = SessionPhase::AwaitingResponse;

        let payload = compose(
            &self.messages,
            self.config.model,
            &self.config.selected_topics,
            &self.catalog,
        );
        Some(PendingRequest {
            generation: self.generation,
            payload,
        })
    }

    /// Applies the result of a buffered exchange.
    ///
    /// On success the assistant message is appended with its retrieval
    /// chunks and classified for the side panel. On failure no assistant
    /// message is appended and the draft is not restored; the user retypes.
    /// Returns false if the result belonged to a cleared session and was
    /// discarded.
    pub fn apply_buffered(
        &mut self,
        generation: u64,
        result: Result<AskResponse, Error>,
    ) -> bool {
        if generation != self.generation {
            observability::STALE_RESULTS_DISCARDED.click();
            return false;
        }
        match result {
            Ok(reply) => {
                let id = self.mint_message_id();
                let message = Message::assistant(id, reply.answer)
                    .with_relevant_chunks(reply.relevant_chunks);
                self.route_to_side_panel(&message.content);
                self.messages.push(message);
                self.phase = SessionPhase::Idle;
            }
            Err(err) => {
                self.error = Some(err);
                self.phase = SessionPhase::Error;
            }
        }
        true
    }

    /// Applies one streamed fragment.
    ///
    /// The first fragment creates the in-progress assistant message and
    /// enters the streaming phase; later fragments extend its content.
    /// Returns false if the fragment belonged to a cleared session, in
    /// which case the caller must stop consuming the stream.
    pub fn apply_fragment(&mut self, generation: u64, fragment: &str) -> bool {
        if generation != self.generation {
            observability::STALE_RESULTS_DISCARDED.click();
            return false;
        }
        match self.phase {
            SessionPhase::AwaitingResponse => {
                let id = self.mint_message_id();
                self.messages.push(Message::assistant(id, fragment));
                self.phase = SessionPhase::Streaming;
                true
            }
            SessionPhase::Streaming => {
                if let Some(message) = self.messages.last_mut() {
                    message.content.push_str(fragment);
                }
                true
            }
            _ => false,
        }
    }

    /// Completes a streamed response, classifying the final content once.
    ///
    /// A stream that yielded no fragments completes back to idle without an
    /// assistant message. Returns false for stale generations.
    pub fn finish_stream(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            observability::STALE_RESULTS_DISCARDED.click();
            return false;
        }
        if self.phase == SessionPhase::Streaming {
            if let Some(content) = self.messages.last().map(|m| m.content.clone()) {
                self.route_to_side_panel(&content);
            }
        }
        if self.is_loading() {
            self.phase = SessionPhase::Idle;
        }
        true
    }

    /// Fails a streamed response.
    ///
    /// Partial content already received is retained and the in-progress
    /// assistant message is marked incomplete. Returns false for stale
    /// generations.
    pub fn fail_stream(&mut self, generation: u64, error: Error) -> bool {
        if generation != self.generation {
            observability::STALE_RESULTS_DISCARDED.click();
            return false;
        }
        if self.phase == SessionPhase::Streaming {
            if let Some(message) = self.messages.last_mut() {
                message.incomplete = true;
            }
        }
        self.error = Some(error);
        self.phase = SessionPhase::Error;
        true
    }

    /// Clears the session: the message log, draft, error, and side panel
    /// all reset, and the generation advances so any in-flight result is
    /// discarded when it arrives.
    pub fn clear(&mut self) {
        observability::SESSION_CLEARS.click();
        self.generation += 1;
        self.messages.clear();
        self.draft.clear();
        self.error = None;
        self.side_panel = SidePanel::default();
        self.phase = SessionPhase::Idle;
    }

    /// Closes the side panel without discarding its content.
    pub fn close_side_panel(&mut self) {
        self.side_panel.is_open = false;
    }

    /// Reopens the side panel if it has content.
    pub fn open_side_panel(&mut self) {
        if !self.side_panel.content.is_empty() {
            self.side_panel.is_open = true;
        }
    }

    /// Classifies completed assistant content and updates the side panel.
    fn route_to_side_panel(&mut self, content: &str) {
        let classification = classify(content);
        if classification.has_side_panel_content {
            self.side_panel.content = classification.panel_content;
            self.side_panel.is_open = true;
        } else {
            self.side_panel.is_open = false;
        }
    }

    /// Sends a user message over the buffered transport.
    ///
    /// Failures do not escape: they are captured in the session state for
    /// the caller to render.
    pub async fn send_buffered<T: ChatTransport + ?Sized>(&mut self, text: &str, transport: &T) {
        let Some(pending) = self.begin_submit(text) else {
            return;
        };
        let generation = pending.generation();
        let result = transport.send_buffered(pending.into_payload()).await;
        self.apply_buffered(generation, result);
    }

    /// Asks a single question against the retrieval backend, attaching the
    /// returned relevance chunks to the assistant message.
    pub async fn ask<T: ChatTransport + ?Sized>(&mut self, text: &str, transport: &T) {
        let Some(pending) = self.begin_submit(text) else {
            return;
        };
        let generation = pending.generation();
        let result = transport.ask(text.trim()).await;
        self.apply_buffered(generation, result);
    }

    /// Sends a user message over the streaming transport, rendering each
    /// fragment as it arrives.
    ///
    /// The renderer's interrupt flag aborts consumption; partial content is
    /// retained and marked incomplete. Failures are rendered and captured
    /// in the session state.
    pub async fn send_streamed<T: ChatTransport + ?Sized>(
        &mut self,
        text: &str,
        transport: &T,
        renderer: &mut dyn Renderer,
    ) {
        let Some(pending) = self.begin_submit(text) else {
            return;
        };
        let generation = pending.generation();

        let mut stream = match transport.send_streamed(pending.into_payload()).await {
            Ok(stream) => stream,
            Err(err) => {
                renderer.print_error(&err.to_string());
                self.apply_buffered(generation, Err(err));
                return;
            }
        };

        loop {
            if renderer.should_interrupt() {
                self.fail_stream(generation, Error::abort("response interrupted"));
                renderer.print_interrupted();
                return;
            }
            match stream.next().await {
                Some(Ok(fragment)) => {
                    if self.apply_fragment(generation, &fragment) {
                        renderer.print_text(&fragment);
                    } else {
                        // The session was cleared mid-stream; stop consuming.
                        return;
                    }
                }
                Some(Err(err)) => {
                    renderer.print_error(&err.to_string());
                    self.fail_stream(generation, err);
                    return;
                }
                None => {
                    self.finish_stream(generation);
                    renderer.finish_response();
                    return;
                }
            }
        }
    }

    /// Clears the session locally and issues a fire-and-forget clear to the
    /// backend; a failed backend clear is ignored.
    pub async fn clear_session<T: ChatTransport + ?Sized>(&mut self, transport: &T) {
        self.clear();
        let _ = transport.clear_session().await;
    }
}
