use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::daemon_error;
use crate::domain::{ports::LlmService, DomainError, Message};

/// Chat completion against an Ollama-compatible `/api/chat` endpoint.
pub struct OllamaLlm {
    client: reqwest::Client,
    host: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

impl OllamaLlm {
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            host: host.into(),
            model: model.into(),
        })
    }
}

fn build_messages<'a>(system: &'a str, history: &'a [Message], prompt: &'a str) -> Vec<WireMessage<'a>> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if !system.is_empty() {
        messages.push(WireMessage {
            role: "system",
            content: system,
        });
    }
    messages.extend(history.iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: &m.content,
    }));
    messages.push(WireMessage {
        role: "user",
        content: prompt,
    });
    messages
}

#[async_trait]
impl LlmService for OllamaLlm {
    #[instrument(skip_all, fields(model = %self.model, history = history.len()))]
    async fn complete_with_history(
        &self,
        system: &str,
        history: &[Message],
        prompt: &str,
    ) -> Result<String, DomainError> {
        let body = ChatRequest {
            model: &self.model,
            messages: build_messages(system, history, prompt),
            stream: false,
        };

        let resp = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&body)
            .send()
            .await
            .map_err(daemon_error)?
            .error_for_status()
            .map_err(daemon_error)?;

        let parsed: ChatResponse = resp.json().await.map_err(daemon_error)?;
        let content = parsed
            .message
            .map(|m| m.content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(DomainError::external("model returned an empty response"));
        }
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
