use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{ports::VectorStore, DocumentChunk, DomainError, Embedding, SearchResult};

/// Knowledge chunks in a Postgres table with a pgvector column.
pub struct PgVectorStore {
    pool: PgPool,
    table: String,
    index_name: String,
    dimension: usize,
}

fn db_error(e: sqlx::Error) -> DomainError {
    DomainError::external(format!("database: {e}"))
}

/// Schema and table names are interpolated into SQL, so only plain identifiers pass.
pub(crate) fn valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl PgVectorStore {
    pub async fn new(
        pool: PgPool,
        schema: &str,
        table: &str,
        dimension: usize,
    ) -> Result<Self, DomainError> {
        for ident in [schema, table] {
            if !valid_identifier(ident) {
                return Err(DomainError::validation(format!(
                    "invalid SQL identifier: {ident:?}"
                )));
            }
        }

        let store = Self {
            pool,
            table: format!("{schema}.{table}"),
            index_name: format!("{table}_document_id_idx"),
            dimension,
        };
        store.ensure_table(schema).await?;
        Ok(store)
    }

    async fn ensure_table(&self, schema: &str) -> Result<(), DomainError> {
        let statements = [
            "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
            format!("CREATE SCHEMA IF NOT EXISTS {schema}"),
            format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id UUID PRIMARY KEY,
                    document_id UUID NOT NULL,
                    content TEXT NOT NULL,
                    chunk_index INTEGER NOT NULL,
                    embedding vector({}) NOT NULL
                )",
                self.table, self.dimension
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} (document_id)",
                self.index_name, self.table
            ),
        ];

        for sql in &statements {
            sqlx::query(sql).execute(&self.pool).await.map_err(db_error)?;
        }

        info!(table = %self.table, dimension = self.dimension, "vector table ready");
        Ok(())
    }

    fn check_dimension(&self, embedding: &Embedding) -> Result<(), DomainError> {
        if embedding.dimension() != self.dimension {
            return Err(DomainError::validation(format!(
                "embedding has {} dimensions, table expects {}",
                embedding.dimension(),
                self.dimension
            )));
        }
        Ok(())
    }

    fn upsert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id, document_id, content, chunk_index, embedding)
             VALUES ($1, $2, $3, $4, $5::vector)
             ON CONFLICT (id) DO UPDATE SET
                document_id = EXCLUDED.document_id,
                content = EXCLUDED.content,
                chunk_index = EXCLUDED.chunk_index,
                embedding = EXCLUDED.embedding",
            self.table
        )
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn upsert(&self, chunk: &DocumentChunk, embedding: &Embedding) -> Result<(), DomainError> {
        self.upsert_batch(&[(chunk.clone(), embedding.clone())]).await
    }

    #[instrument(skip_all, fields(count = items.len()))]
    async fn upsert_batch(&self, items: &[(DocumentChunk, Embedding)]) -> Result<(), DomainError> {
        let sql = self.upsert_sql();
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for (chunk, embedding) in items {
            self.check_dimension(embedding)?;
            sqlx::query(&sql)
                .bind(chunk.id)
                .bind(chunk.document_id)
                .bind(&chunk.content)
                .bind(chunk.chunk_index as i32)
                .bind(embedding.to_pgvector_literal())
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)
    }

    async fn search(&self, query: &Embedding, top_k: usize) -> Result<Vec<SearchResult>, DomainError> {
        self.check_dimension(query)?;

        let sql = format!(
            "SELECT id, document_id, content, chunk_index,
                    1 - (embedding <=> $1::vector) AS score
             FROM {}
             ORDER BY embedding <=> $1::vector
             LIMIT $2",
            self.table
        );

        let rows = sqlx::query(&sql)
            .bind(query.to_pgvector_literal())
            .bind(i64::try_from(top_k).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter()
            .map(|row| -> Result<SearchResult, DomainError> {
                let chunk_index: i32 = row.try_get("chunk_index").map_err(db_error)?;
                let score: f64 = row.try_get("score").map_err(db_error)?;
                Ok(SearchResult {
                    chunk: DocumentChunk {
                        id: row.try_get("id").map_err(db_error)?,
                        document_id: row.try_get("document_id").map_err(db_error)?,
                        content: row.try_get("content").map_err(db_error)?,
                        chunk_index: chunk_index.max(0) as usize,
                    },
                    score: score as f32,
                })
            })
            .collect()
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<u64, DomainError> {
        let sql = format!("DELETE FROM {} WHERE document_id = $1", self.table);
        let result = sqlx::query(&sql)
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifier() {
        assert!(valid_identifier("ai"));
        assert!(valid_identifier("agno_vectors"));
        assert!(valid_identifier("_t1"));
        assert!(!valid_identifier(""));
        assert!(!valid_identifier("1table"));
        assert!(!valid_identifier("ai; DROP TABLE x"));
        assert!(!valid_identifier("a.b"));
    }
}
