mod embedding;
mod llm;
mod probe;
mod session_store;
mod vector_store;

pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use probe::DependencyProbe;
pub use session_store::SessionStore;
pub use vector_store::VectorStore;
