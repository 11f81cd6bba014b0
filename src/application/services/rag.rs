use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DocumentChunk, DomainError, SearchResult,
};

/// Embeds text and keeps it searchable in a [`VectorStore`].
pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    default_top_k: usize,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            default_top_k,
        }
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// `top_k == 0` short-circuits without touching the embedder.
    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.embedding.embed(query).await?;
        self.vector_store.search(&embedding, top_k).await
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn index_chunks(&self, chunks: &[DocumentChunk]) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(DomainError::internal(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let items: Vec<_> = chunks.iter().cloned().zip(embeddings).collect();
        self.vector_store.upsert_batch(&items).await
    }

    #[instrument(skip(self))]
    pub async fn delete_document(&self, document_id: uuid::Uuid) -> Result<u64, DomainError> {
        self.vector_store.delete_by_document(document_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Embedding;
    use crate::infrastructure::InMemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Embeds by text length and counts calls.
    #[derive(Default)]
    struct LengthEmbedding {
        calls: AtomicUsize,
        short_by: usize,
    }

    #[async_trait]
    impl EmbeddingService for LengthEmbedding {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let keep = texts.len().saturating_sub(self.short_by);
            Ok(texts[..keep]
                .iter()
                .map(|t| Embedding::new(vec![t.len() as f32, 1.0]))
                .collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn chunks(texts: &[&str]) -> Vec<DocumentChunk> {
        let doc = Uuid::new_v4();
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| DocumentChunk::new(doc, *t, i))
            .collect()
    }

    #[tokio::test]
    async fn test_index_then_retrieve() {
        let store = Arc::new(InMemoryVectorStore::new());
        let rag = RagService::new(Arc::new(LengthEmbedding::default()), store.clone(), 2);

        rag.index_chunks(&chunks(&["a", "bbbbbbbbbb", "cc"])).await.unwrap();
        assert_eq!(store.len(), 3);

        let hits = rag.retrieve_top_k("x", rag.default_top_k()).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_top_k_skips_embedding() {
        let embedding = Arc::new(LengthEmbedding::default());
        let rag = RagService::new(embedding.clone(), Arc::new(InMemoryVectorStore::new()), 3);

        assert!(rag.retrieve_top_k("x", 0).await.unwrap().is_empty());
        assert_eq!(embedding.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embedding_count_mismatch_is_rejected() {
        let embedding = Arc::new(LengthEmbedding {
            short_by: 1,
            ..Default::default()
        });
        let store = Arc::new(InMemoryVectorStore::new());
        let rag = RagService::new(embedding, store.clone(), 3);

        let err = rag.index_chunks(&chunks(&["a", "b"])).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert!(store.is_empty());
    }
}
