#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agentos::api::AppState;
use agentos::application::{ConversationService, HealthService, KnowledgeService, RagService};
use agentos::domain::ports::{DependencyProbe, EmbeddingService, LlmService};
use agentos::domain::{AgentProfile, DomainError, Embedding, Message};
use agentos::infrastructure::{AppConfig, ChatAgent, InMemorySessionStore, InMemoryVectorStore};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

pub struct FixedProbe(pub bool);

#[async_trait]
impl DependencyProbe for FixedProbe {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn ping(&self) -> bool {
        self.0
    }
}

/// Echoes the prompt, optionally after a delay.
pub struct EchoLlm {
    pub delay: Option<Duration>,
}

#[async_trait]
impl LlmService for EchoLlm {
    async fn complete_with_history(
        &self,
        _system: &str,
        history: &[Message],
        prompt: &str,
    ) -> Result<String, DomainError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("echo({}): {prompt}", history.len()))
    }

    fn model(&self) -> &str {
        "echo"
    }
}

/// Always fails the way an unreachable daemon does.
pub struct DownLlm;

#[async_trait]
impl LlmService for DownLlm {
    async fn complete_with_history(
        &self,
        _system: &str,
        _history: &[Message],
        _prompt: &str,
    ) -> Result<String, DomainError> {
        Err(DomainError::unavailable("cannot reach inference daemon"))
    }

    fn model(&self) -> &str {
        "down"
    }
}

/// Counts of a few marker letters, enough to tell topics apart.
pub struct LetterEmbedding;

#[async_trait]
impl EmbeddingService for LetterEmbedding {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                Embedding::new(
                    ['a', 'e', 'o', 'x', 'z']
                        .iter()
                        .map(|c| lower.matches(*c).count() as f32)
                        .collect(),
                )
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        5
    }
}

/// Knowledge base over an in-memory store, small chunks.
pub fn knowledge() -> Arc<KnowledgeService> {
    let rag = RagService::new(
        Arc::new(LetterEmbedding),
        Arc::new(InMemoryVectorStore::new()),
        2,
    );
    Arc::new(KnowledgeService::new(Arc::new(rag), 20))
}

pub fn health(db: bool, llm: bool) -> Arc<HealthService> {
    Arc::new(HealthService::new(
        Arc::new(FixedProbe(db)),
        Arc::new(FixedProbe(llm)),
        Duration::ZERO,
    ))
}

pub fn conversation(delay: Option<Duration>, timeout: Duration) -> Arc<ConversationService> {
    conversation_with(Arc::new(EchoLlm { delay }), timeout)
}

pub fn conversation_with(llm: Arc<dyn LlmService>, timeout: Duration) -> Arc<ConversationService> {
    let agent = ChatAgent::new(llm, AgentProfile::default(), timeout);
    Arc::new(
        ConversationService::new(Arc::new(agent))
            .with_sessions(Arc::new(InMemorySessionStore::new())),
    )
}

/// Both dependencies up, agent ready, database connected.
pub fn ready_state(config: AppConfig) -> AppState {
    AppState::new(config, health(true, true))
        .with_conversation(conversation(None, Duration::from_secs(5)))
        .with_database(true)
}

pub fn with_key(key: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.security.api_key = Some(key.to_string());
    config
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_raw(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
