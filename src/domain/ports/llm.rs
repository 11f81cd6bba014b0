use crate::domain::{errors::DomainError, Message};
use async_trait::async_trait;

#[async_trait]
pub trait LlmService: Send + Sync {
    /// Sends `history` followed by `prompt` as a user turn.
    async fn complete_with_history(
        &self,
        system: &str,
        history: &[Message],
        prompt: &str,
    ) -> Result<String, DomainError>;

    fn model(&self) -> &str;

    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, DomainError> {
        self.complete_with_history(system, &[], prompt).await
    }
}
