use crate::domain::{errors::DomainError, Message};
use async_trait::async_trait;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn ensure_session(&self, session_id: &str) -> Result<(), DomainError>;

    /// Up to `limit` most recent messages, oldest first.
    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError>;

    async fn append(&self, session_id: &str, message: &Message) -> Result<(), DomainError>;

    async fn record_metric(
        &self,
        session_id: &str,
        name: &str,
        value: f64,
    ) -> Result<(), DomainError>;
}
