mod conversation;
mod health;
mod knowledge;
mod rag;

pub use conversation::ConversationService;
pub use health::{HealthCache, HealthService};
pub use knowledge::{IngestReport, KnowledgeService, MAX_SEARCH_LIMIT};
pub use rag::RagService;
