mod agent;
mod conversation;
mod document;
mod embedding;
mod health;

pub use agent::{AgentInfo, AgentProfile, AgentStatus, DEFAULT_AGENT_ID};
pub use conversation::{Conversation, Message, MessageRole};
pub use document::{chunk_content, Document, DocumentChunk, SearchResult};
pub use embedding::Embedding;
pub use health::HealthStatus;
