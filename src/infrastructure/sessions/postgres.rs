use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use crate::domain::{ports::SessionStore, DomainError, Message};

/// Conversation memory in the `agno_sessions` / `agno_memories` / `agno_metrics` tables.
///
/// Each memory row holds one JSON-serialized [`Message`].
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> DomainError {
    DomainError::external(format!("database: {e}"))
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn ensure_session(&self, session_id: &str) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO agno_sessions (session_id) VALUES ($1) ON CONFLICT (session_id) DO NOTHING",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT memory FROM agno_memories WHERE session_id = $1 ORDER BY id DESC LIMIT $2",
        )
        .bind(session_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        // Rows not written by this service are skipped rather than failing the chat.
        let mut messages: Vec<Message> = rows
            .into_iter()
            .filter_map(|(raw,)| match serde_json::from_str(&raw) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!(session_id, error = %e, "skipping unreadable memory row");
                    None
                }
            })
            .collect();
        messages.reverse();
        Ok(messages)
    }

    async fn append(&self, session_id: &str, message: &Message) -> Result<(), DomainError> {
        let raw = serde_json::to_string(message)
            .map_err(|e| DomainError::internal(format!("serialize memory: {e}")))?;
        sqlx::query("INSERT INTO agno_memories (session_id, memory) VALUES ($1, $2)")
            .bind(session_id)
            .bind(raw)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn record_metric(
        &self,
        session_id: &str,
        name: &str,
        value: f64,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO agno_metrics (session_id, metric_name, metric_value) VALUES ($1, $2, $3)",
        )
        .bind(session_id)
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}
