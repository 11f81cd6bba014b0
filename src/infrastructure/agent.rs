use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::application::RagService;
use crate::domain::{ports::LlmService, AgentProfile, DomainError, Message};

pub struct ChatAgent {
    llm: Arc<dyn LlmService>,
    profile: AgentProfile,
    rag: Option<Arc<RagService>>,
    top_k: usize,
    timeout: Duration,
}

impl ChatAgent {
    pub fn new(llm: Arc<dyn LlmService>, profile: AgentProfile, timeout: Duration) -> Self {
        Self {
            llm,
            profile,
            rag: None,
            top_k: 3,
            timeout,
        }
    }

    pub fn with_knowledge(mut self, rag: Arc<RagService>, top_k: usize) -> Self {
        self.rag = Some(rag);
        self.top_k = top_k;
        self
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retrieval and generation share one deadline.
    pub async fn chat_with_history(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<String, DomainError> {
        tokio::time::timeout(self.timeout, self.run(message, history))
            .await
            .map_err(|_| DomainError::timeout("Agent execution timed out"))?
    }

    async fn run(&self, message: &str, history: &[Message]) -> Result<String, DomainError> {
        let system = self.system_prompt(Utc::now());
        let prompt = match self.knowledge_context(message).await {
            Some(context) => format!(
                "Relevant knowledge:\n{}\n\nQuestion: {}",
                context, message
            ),
            None => message.to_string(),
        };

        self.llm
            .complete_with_history(&system, history, &prompt)
            .await
    }

    fn system_prompt(&self, now: DateTime<Utc>) -> String {
        let mut lines: Vec<String> = self.profile.instructions.clone();
        if self.profile.markdown {
            lines.push("Use markdown formatting for readability.".to_string());
        }
        if self.profile.add_datetime {
            lines.push(format!(
                "The current time is {}.",
                now.format("%Y-%m-%d %H:%M UTC")
            ));
        }
        lines.join("\n")
    }

    /// A failed lookup degrades to answering without context.
    async fn knowledge_context(&self, message: &str) -> Option<String> {
        let rag = self.rag.as_ref()?;

        let results = match rag.retrieve_top_k(message, self.top_k).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "knowledge lookup failed, answering without context");
                return None;
            }
        };
        debug!(hits = results.len(), "knowledge lookup");

        if results.is_empty() {
            return None;
        }

        Some(
            results
                .iter()
                .enumerate()
                .map(|(i, r)| format!("[{}] {}", i + 1, r.chunk.content))
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    }
}
