//! HTTP client for the documentation assistant backend.
//!
//! The [`DocsBackend`] client speaks three endpoints: the multi-turn,
//! topic-scoped `/chat` endpoint (buffered or streamed), the single-question
//! retrieval endpoint `/api/ask`, and the session-clearing `/api/clear`.
//! The [`ChatTransport`] trait is the seam between the session controller
//! and the network; it holds no session state.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability;
use crate::sse::process_token_stream;
use crate::types::{AskRequest, AskResponse, ChatRequest, ChatResponse};

/// Default backend base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A lazy, finite, non-restartable stream of response text fragments.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// The network exchange the session controller depends on.
///
/// Requests are not idempotent-safe: a failed call may already have mutated
/// server-side session state, so implementations must not retry silently.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a composed chat payload and return the buffered reply.
    async fn send_buffered(&self, request: ChatRequest) -> Result<AskResponse>;

    /// Send a composed chat payload and return an incremental token stream.
    async fn send_streamed(&self, request: ChatRequest) -> Result<TokenStream>;

    /// Ask a single question against the retrieval backend.
    async fn ask(&self, question: &str) -> Result<AskResponse>;

    /// Clear any server-side session state.
    async fn clear_session(&self) -> Result<()>;
}

/// Client for the documentation assistant backend.
#[derive(Debug, Clone)]
pub struct DocsBackend {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl DocsBackend {
    /// Create a new client against the default local backend.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// The base URL is injected by the embedding application; the client
    /// never reads the process environment.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        // Validate early so a bad URL fails at construction, not mid-session.
        Url::parse(&base_url)?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn map_request_error(&self, e: reqwest::Error) -> Error {
        observability::CLIENT_REQUEST_ERRORS.click();
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Convert a non-success response into an error.
    async fn process_error_response(response: Response) -> Error {
        observability::CLIENT_REQUEST_ERRORS.click();
        let status_code = response.status().as_u16();

        // The backend reports errors as {"detail": "..."}.
        #[derive(Deserialize)]
        struct ErrorResponse {
            detail: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.detail)
            .unwrap_or(error_body);

        match status_code {
            408 => Error::timeout(message, None),
            _ => Error::api(status_code, message),
        }
    }

    async fn post_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        observability::CLIENT_REQUESTS.click();
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(response)
    }

    /// Ask a single question and get the answer plus its retrieval chunks.
    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let response = self
            .post_json("/api/ask", &AskRequest::new(question))
            .await?;

        response.json::<AskResponse>().await.map_err(|e| {
            Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
        })
    }

    /// Clear server-side session state. The response carries no payload.
    pub async fn clear_session(&self) -> Result<()> {
        observability::CLIENT_REQUESTS.click();
        let url = format!("{}/api/clear", self.base_url);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        Ok(())
    }

    /// Send a composed chat payload and get the buffered response.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self.post_json("/chat", request).await?;

        response.json::<ChatResponse>().await.map_err(|e| {
            Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
        })
    }

    /// Send a composed chat payload and get a streaming response.
    ///
    /// Returns a stream of text fragments that can be consumed incrementally.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<TokenStream> {
        observability::CLIENT_REQUESTS.click();
        let url = format!("{}/chat", self.base_url);

        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        // Map transport errors into ours before handing off to the parser.
        let byte_stream = response.bytes_stream().map(|result| {
            result.map_err(|e| {
                Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e)))
            })
        });

        Ok(Box::pin(process_token_stream(Box::pin(byte_stream))))
    }
}

#[async_trait]
impl ChatTransport for DocsBackend {
    async fn send_buffered(&self, request: ChatRequest) -> Result<AskResponse> {
        // The buffered /chat variant carries no retrieval chunks.
        let response = self.chat(&request).await?;
        Ok(AskResponse::new(response.response))
    }

    async fn send_streamed(&self, request: ChatRequest) -> Result<TokenStream> {
        self.chat_stream(&request).await
    }

    async fn ask(&self, question: &str) -> Result<AskResponse> {
        DocsBackend::ask(self, question).await
    }

    async fn clear_session(&self) -> Result<()> {
        DocsBackend::clear_session(self).await
    }
}
