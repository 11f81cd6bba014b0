mod in_memory;
mod pgvector;

pub use in_memory::InMemoryVectorStore;
pub use pgvector::PgVectorStore;
