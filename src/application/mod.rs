//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! adapters, so the HTTP layer and tests can swap implementations.

pub mod services;

pub use services::{
    ConversationService, HealthCache, HealthService, KnowledgeService, RagService,
};
