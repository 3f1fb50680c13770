//! End-to-end session tests against a scripted transport.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;

use docent::client::{ChatTransport, TokenStream};
use docent::context::FENCE_INSTRUCTION;
use docent::render::Renderer;
use docent::session::{SessionConfig, SessionController, SessionPhase};
use docent::types::{
    AskResponse, ChatRequest, MessageRole, ModelKey, RelevantChunk, TopicCatalog,
};
use docent::{Error, Result};

/// A transport that replays scripted results and records what it was asked.
#[derive(Default)]
struct StubTransport {
    answer: Mutex<Option<Result<AskResponse>>>,
    fragments: Mutex<Vec<Result<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
    questions: Mutex<Vec<String>>,
    clears: AtomicUsize,
}

impl StubTransport {
    fn buffered(answer: AskResponse) -> Self {
        let transport = Self::default();
        *transport.answer.lock().unwrap() = Some(Ok(answer));
        transport
    }

    fn failing(err: Error) -> Self {
        let transport = Self::default();
        *transport.answer.lock().unwrap() = Some(Err(err));
        transport
    }

    fn streaming(fragments: Vec<Result<String>>) -> Self {
        let transport = Self::default();
        *transport.fragments.lock().unwrap() = fragments;
        transport
    }

    fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn send_buffered(&self, request: ChatRequest) -> Result<AskResponse> {
        self.requests.lock().unwrap().push(request);
        self.answer
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(Error::unknown("no scripted reply")))
    }

    async fn send_streamed(&self, request: ChatRequest) -> Result<TokenStream> {
        self.requests.lock().unwrap().push(request);
        let fragments = std::mem::take(&mut *self.fragments.lock().unwrap());
        Ok(Box::pin(stream::iter(fragments)))
    }

    async fn ask(&self, question: &str) -> Result<AskResponse> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answer
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(Error::unknown("no scripted reply")))
    }

    async fn clear_session(&self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A renderer that records output and can interrupt after a fragment count.
#[derive(Default)]
struct RecordingRenderer {
    text: String,
    errors: Vec<String>,
    interrupted: bool,
    interrupt_after: Option<usize>,
    fragments_seen: usize,
}

impl Renderer for RecordingRenderer {
    fn print_text(&mut self, text: &str) {
        self.text.push_str(text);
        self.fragments_seen += 1;
    }

    fn print_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn print_info(&mut self, _info: &str) {}

    fn print_panel(&mut self, _content: &str) {}

    fn finish_response(&mut self) {}

    fn print_interrupted(&mut self) {
        self.interrupted = true;
    }

    fn should_interrupt(&self) -> bool {
        self.interrupt_after
            .is_some_and(|after| self.fragments_seen >= after)
    }
}

fn session_with(config: SessionConfig) -> SessionController {
    SessionController::new(config, TopicCatalog::builtin())
}

#[tokio::test]
async fn buffered_round_trip() {
    let transport = StubTransport::buffered(AskResponse::new("Use a unit test."));
    let mut session = session_with(SessionConfig::new());

    session.send_buffered("How should I test this?", &transport).await;

    assert_eq!(session.phase(), SessionPhase::Idle);
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "How should I test this?");
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].content, "Use a unit test.");
}

#[tokio::test]
async fn request_carries_context_model_and_topics() {
    let transport = StubTransport::buffered(AskResponse::new("ok"));
    let config = SessionConfig::new()
        .with_model(ModelKey::Accurate)
        .with_selected_topics(vec!["api-design".to_string()]);
    let mut session = session_with(config);

    session.send_buffered("How do I version an endpoint?", &transport).await;

    let requests = transport.recorded_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, "gpt-4-turbo");
    assert_eq!(request.selected_topics, vec!["api-design".to_string()]);

    // The system turn leads the payload and names the selected topic by
    // its display label.
    let system = &request.messages[0];
    assert_eq!(system.role, MessageRole::System);
    assert!(
        system
            .content
            .contains("You are an AI assistant specialized in: API Design.")
    );
    assert!(system.content.contains(FENCE_INSTRUCTION));
    assert_eq!(request.messages[1].content, "How do I version an endpoint?");
}

#[tokio::test]
async fn unknown_topics_dropped_from_context() {
    let transport = StubTransport::buffered(AskResponse::new("ok"));
    let config =
        SessionConfig::new().with_selected_topics(vec!["no-such-topic".to_string()]);
    let mut session = session_with(config);

    session.send_buffered("hello", &transport).await;

    let requests = transport.recorded_requests();
    let system = &requests[0].messages[0];
    assert!(system.content.starts_with("You are a general AI assistant."));
    // The raw selection still travels on the wire.
    assert_eq!(
        requests[0].selected_topics,
        vec!["no-such-topic".to_string()]
    );
}

#[tokio::test]
async fn streamed_reply_matches_buffered_content() {
    let transport = StubTransport::streaming(vec![
        Ok("Use ".to_string()),
        Ok("a unit ".to_string()),
        Ok("test.".to_string()),
    ]);
    let mut session = session_with(SessionConfig::new());
    let mut renderer = RecordingRenderer::default();

    session
        .send_streamed("How should I test this?", &transport, &mut renderer)
        .await;

    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(session.messages()[1].content, "Use a unit test.");
    assert_eq!(renderer.text, "Use a unit test.");
    assert!(!session.messages()[1].incomplete);
}

#[tokio::test]
async fn streamed_failure_keeps_partial_content() {
    let transport = StubTransport::streaming(vec![
        Ok("partial ".to_string()),
        Err(Error::streaming("connection reset", None)),
    ]);
    let mut session = session_with(SessionConfig::new());
    let mut renderer = RecordingRenderer::default();

    session.send_streamed("question", &transport, &mut renderer).await;

    assert_eq!(session.phase(), SessionPhase::Error);
    let assistant = &session.messages()[1];
    assert_eq!(assistant.content, "partial ");
    assert!(assistant.incomplete);
    assert_eq!(renderer.errors.len(), 1);
}

#[tokio::test]
async fn interrupt_aborts_stream_and_keeps_partial() {
    let transport = StubTransport::streaming(vec![
        Ok("first".to_string()),
        Ok(" second".to_string()),
        Ok(" third".to_string()),
    ]);
    let mut session = session_with(SessionConfig::new());
    let mut renderer = RecordingRenderer {
        interrupt_after: Some(1),
        ..RecordingRenderer::default()
    };

    session.send_streamed("question", &transport, &mut renderer).await;

    assert!(renderer.interrupted);
    assert_eq!(session.phase(), SessionPhase::Error);
    assert!(session.error().unwrap().is_abort());
    let assistant = &session.messages()[1];
    assert_eq!(assistant.content, "first");
    assert!(assistant.incomplete);
}

#[tokio::test]
async fn fenced_buffered_reply_promoted_to_panel() {
    let transport = StubTransport::buffered(AskResponse::new("```print(1)```"));
    let mut session = session_with(SessionConfig::new());

    session.send_buffered("show me code", &transport).await;

    assert!(session.side_panel().is_open);
    assert_eq!(session.side_panel().content, "```print(1)```");
    // The full text still lives in the message log.
    assert_eq!(session.messages()[1].content, "```print(1)```");
}

#[tokio::test]
async fn fenced_streamed_reply_promoted_after_completion() {
    let transport = StubTransport::streaming(vec![
        Ok("```rust\n".to_string()),
        Ok("let x = 1;\n".to_string()),
        Ok("```".to_string()),
    ]);
    let mut session = session_with(SessionConfig::new());
    let mut renderer = RecordingRenderer::default();

    session.send_streamed("code please", &transport, &mut renderer).await;

    assert!(session.side_panel().is_open);
    assert_eq!(session.side_panel().content, "```rust\nlet x = 1;\n```");
}

#[tokio::test]
async fn plain_reply_closes_panel_but_keeps_content() {
    let transport = StubTransport::buffered(AskResponse::new("```x```"));
    let mut session = session_with(SessionConfig::new());
    session.send_buffered("code", &transport).await;
    assert!(session.side_panel().is_open);

    *transport.answer.lock().unwrap() = Some(Ok(AskResponse::new("plain text")));
    session.send_buffered("no code now", &transport).await;

    assert!(!session.side_panel().is_open);
    assert_eq!(session.side_panel().content, "```x```");
}

#[tokio::test]
async fn transport_failure_lands_in_error_phase() {
    let transport = StubTransport::failing(Error::api(503, "model overloaded"));
    let mut session = session_with(SessionConfig::new());

    session.send_buffered("question", &transport).await;

    assert_eq!(session.phase(), SessionPhase::Error);
    assert_eq!(session.error().unwrap().status_code(), Some(503));
    // The user turn stays in the log; no assistant turn was appended.
    assert_eq!(session.message_count(), 1);
}

#[tokio::test]
async fn ask_attaches_relevance_chunks() {
    let reply = AskResponse::new("The answer.").with_relevant_chunks(vec![
        RelevantChunk::new("first source", 0.91),
        RelevantChunk::new("second source", 0.47),
    ]);
    let transport = StubTransport::buffered(reply);
    let mut session = session_with(SessionConfig::new());

    session.ask("where is this documented?", &transport).await;

    assert_eq!(
        transport.questions.lock().unwrap().as_slice(),
        ["where is this documented?"]
    );
    let assistant = &session.messages()[1];
    assert_eq!(assistant.relevant_chunks.len(), 2);
    assert_eq!(assistant.relevant_chunks[0].score, 0.91);
}

#[tokio::test]
async fn clear_wipes_local_state_and_notifies_server() {
    let transport = StubTransport::buffered(AskResponse::new("one"));
    let mut session = session_with(SessionConfig::new());
    session.send_buffered("q1", &transport).await;
    *transport.answer.lock().unwrap() = Some(Ok(AskResponse::new("two")));
    session.send_buffered("q2", &transport).await;
    assert_eq!(session.message_count(), 4);

    session.clear_session(&transport).await;

    assert_eq!(session.message_count(), 0);
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert_eq!(transport.clears.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retry_after_error_succeeds() {
    let transport = StubTransport::failing(Error::connection("refused", None));
    let mut session = session_with(SessionConfig::new());
    session.send_buffered("question", &transport).await;
    assert_eq!(session.phase(), SessionPhase::Error);

    *transport.answer.lock().unwrap() = Some(Ok(AskResponse::new("recovered")));
    session.send_buffered("question again", &transport).await;

    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.error().is_none());
    assert_eq!(session.messages().last().unwrap().content, "recovered");
}
