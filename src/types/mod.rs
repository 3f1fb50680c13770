// Public modules
pub mod message;
pub mod model;
pub mod relevant_chunk;
pub mod request;
pub mod topic;

// Re-exports
pub use message::{Message, MessageRole};
pub use model::ModelKey;
pub use relevant_chunk::RelevantChunk;
pub use request::{AskRequest, AskResponse, ChatMessage, ChatRequest, ChatResponse};
pub use topic::{Topic, TopicCatalog};
