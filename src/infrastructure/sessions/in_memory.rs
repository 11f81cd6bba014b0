use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ports::SessionStore, Conversation, DomainError, Message};

#[derive(Default)]
pub struct InMemorySessionStore {
    conversations: RwLock<HashMap<String, Conversation>>,
    metrics: RwLock<Vec<(String, String, f64)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn metrics(&self, session_id: &str) -> Vec<(String, f64)> {
        self.metrics
            .read()
            .await
            .iter()
            .filter(|(s, _, _)| s == session_id)
            .map(|(_, name, value)| (name.clone(), *value))
            .collect()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn ensure_session(&self, session_id: &str) -> Result<(), DomainError> {
        self.conversations
            .write()
            .await
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation::new(session_id));
        Ok(())
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError> {
        Ok(self
            .conversations
            .read()
            .await
            .get(session_id)
            .map(|c| c.recent(limit).to_vec())
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, message: &Message) -> Result<(), DomainError> {
        self.conversations
            .write()
            .await
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation::new(session_id))
            .push(message.clone());
        Ok(())
    }

    async fn record_metric(
        &self,
        session_id: &str,
        name: &str,
        value: f64,
    ) -> Result<(), DomainError> {
        self.metrics
            .write()
            .await
            .push((session_id.to_string(), name.to_string(), value));
        Ok(())
    }
}
