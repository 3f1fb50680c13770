// Public modules
pub mod classify;
pub mod client;
pub mod compose;
pub mod context;
pub mod error;
pub mod observability;
pub mod render;
pub mod session;
pub mod sse;
pub mod types;

// Re-exports
pub use classify::{Classification, PANEL_PLACEHOLDER, classify};
pub use client::{ChatTransport, DEFAULT_BASE_URL, DocsBackend, TokenStream};
pub use compose::compose;
pub use context::system_context;
pub use error::{Error, Result};
pub use session::{SessionConfig, SessionController, SessionPhase};
pub use types::*;
