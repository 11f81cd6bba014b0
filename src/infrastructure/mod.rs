pub mod agent;
pub mod config;
pub mod database;
pub mod embedding;
pub mod llm;
pub mod probes;
pub mod sessions;
pub mod telemetry;
pub mod vector_store;

pub use agent::ChatAgent;
pub use config::{AppConfig, ConfigError};
pub use embedding::OllamaEmbedding;
pub use llm::OllamaLlm;
pub use probes::{OllamaProbe, PostgresProbe};
pub use sessions::{InMemorySessionStore, PostgresSessionStore};
pub use vector_store::{InMemoryVectorStore, PgVectorStore};
