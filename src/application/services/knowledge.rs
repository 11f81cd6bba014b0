use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::RagService;
use crate::domain::{chunk_content, Document, DomainError, SearchResult};

/// Upper bound on hits a single search may ask for.
pub const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document: Document,
    pub chunks: usize,
}

/// Feeds named texts into the vector store the agent retrieves from.
pub struct KnowledgeService {
    rag: Arc<RagService>,
    chunk_size: usize,
}

impl KnowledgeService {
    pub fn new(rag: Arc<RagService>, chunk_size: usize) -> Self {
        Self { rag, chunk_size }
    }

    #[instrument(skip(self, content))]
    pub async fn ingest(&self, name: &str, content: &str) -> Result<IngestReport, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }

        let document = Document::new(name.trim());
        let chunks = chunk_content(document.id, content, self.chunk_size);
        if chunks.is_empty() {
            return Err(DomainError::validation("content must not be empty"));
        }

        self.rag.index_chunks(&chunks).await?;
        info!(document_id = %document.id, chunks = chunks.len(), "document indexed");

        Ok(IngestReport {
            document,
            chunks: chunks.len(),
        })
    }

    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }
        self.rag
            .retrieve_top_k(query, self.effective_limit(limit))
            .await
    }

    fn effective_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or_else(|| self.rag.default_top_k())
            .min(MAX_SEARCH_LIMIT)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, document_id: Uuid) -> Result<(), DomainError> {
        match self.rag.delete_document(document_id).await? {
            0 => Err(DomainError::not_found(format!("document {document_id}"))),
            _ => Ok(()),
        }
    }
}
