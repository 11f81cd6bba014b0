use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::domain::{ports::SessionStore, DomainError, Message};
use crate::infrastructure::ChatAgent;

const RESPONSE_TIME_METRIC: &str = "response_time_ms";

/// Runs the agent, threading session memory through when a session id is given.
///
/// Memory is best effort: store failures are logged and the chat proceeds.
pub struct ConversationService {
    agent: Arc<ChatAgent>,
    sessions: Option<Arc<dyn SessionStore>>,
}

impl ConversationService {
    pub fn new(agent: Arc<ChatAgent>) -> Self {
        Self {
            agent,
            sessions: None,
        }
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    #[instrument(skip(self, message), fields(chars = message.len()))]
    pub async fn respond(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<String, DomainError> {
        let preview: String = message.chars().take(50).collect();
        info!(preview = %preview, "processing message");

        let sessions = match (self.sessions.as_ref(), session_id) {
            (Some(store), Some(id)) => Some((store, id)),
            _ => None,
        };

        let history = match sessions {
            Some((store, id)) => self.load_history(store.as_ref(), id).await,
            None => Vec::new(),
        };

        let started = Instant::now();
        let reply = self.agent.chat_with_history(message, &history).await?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        if let Some((store, id)) = sessions {
            self.remember(store.as_ref(), id, message, &reply, elapsed_ms)
                .await;
        }

        Ok(reply)
    }

    async fn load_history(&self, store: &dyn SessionStore, session_id: &str) -> Vec<Message> {
        let limit = self.agent.profile().history_runs * 2;
        if limit == 0 {
            return Vec::new();
        }
        match store.recent_messages(session_id, limit).await {
            Ok(history) => history,
            Err(e) => {
                warn!(session_id, error = %e, "could not load session history");
                Vec::new()
            }
        }
    }

    async fn remember(
        &self,
        store: &dyn SessionStore,
        session_id: &str,
        message: &str,
        reply: &str,
        elapsed_ms: f64,
    ) {
        let result = async {
            store.ensure_session(session_id).await?;
            store.append(session_id, &Message::user(message)).await?;
            store.append(session_id, &Message::assistant(reply)).await?;
            store
                .record_metric(session_id, RESPONSE_TIME_METRIC, elapsed_ms)
                .await
        }
        .await;

        if let Err(e) = result {
            warn!(session_id, error = %e, "could not persist session memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ports::LlmService, AgentProfile};
    use crate::infrastructure::InMemorySessionStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct HistoryLlm {
        history_lens: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl LlmService for HistoryLlm {
        async fn complete_with_history(
            &self,
            _system: &str,
            history: &[Message],
            prompt: &str,
        ) -> Result<String, DomainError> {
            self.history_lens.lock().unwrap().push(history.len());
            Ok(format!("re: {prompt}"))
        }

        fn model(&self) -> &str {
            "history"
        }
    }

    fn service(history_runs: usize) -> (ConversationService, Arc<HistoryLlm>, Arc<InMemorySessionStore>) {
        let llm = Arc::new(HistoryLlm::default());
        let profile = AgentProfile {
            history_runs,
            ..AgentProfile::default()
        };
        let agent = Arc::new(ChatAgent::new(llm.clone(), profile, Duration::from_secs(1)));
        let store = Arc::new(InMemorySessionStore::new());
        let service = ConversationService::new(agent).with_sessions(store.clone());
        (service, llm, store)
    }

    #[tokio::test]
    async fn test_session_history_grows_and_is_capped() {
        let (service, llm, store) = service(1);

        for i in 0..3 {
            service.respond(&format!("q{i}"), Some("s1")).await.unwrap();
        }

        assert_eq!(*llm.history_lens.lock().unwrap(), vec![0, 2, 2]);
        let stored = store.recent_messages("s1", 10).await.unwrap();
        assert_eq!(stored.len(), 6);
        assert_eq!(stored[5], Message::assistant("re: q2"));
        assert_eq!(store.metrics("s1").await.len(), 3);
    }

    #[tokio::test]
    async fn test_no_session_id_means_no_memory() {
        let (service, llm, store) = service(5);

        service.respond("hello", None).await.unwrap();
        service.respond("again", None).await.unwrap();

        assert_eq!(*llm.history_lens.lock().unwrap(), vec![0, 0]);
        assert!(store.metrics("").await.is_empty());
    }
}
