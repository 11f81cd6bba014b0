use std::sync::Arc;

use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::application::{ConversationService, HealthService, KnowledgeService, RagService};
use crate::domain::ports::{SessionStore, VectorStore};
use crate::domain::AgentInfo;
use crate::infrastructure::{
    AppConfig, ChatAgent, InMemorySessionStore, InMemoryVectorStore, OllamaEmbedding, OllamaLlm,
    OllamaProbe, PgVectorStore, PostgresProbe, PostgresSessionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub health: Arc<HealthService>,
    pub conversation: Option<Arc<ConversationService>>,
    pub knowledge: Option<Arc<KnowledgeService>>,
    /// Whether the startup connection to Postgres succeeded.
    pub db_connected: bool,
}

impl AppState {
    pub fn new(config: AppConfig, health: Arc<HealthService>) -> Self {
        Self {
            config: Arc::new(config),
            health,
            conversation: None,
            knowledge: None,
            db_connected: false,
        }
    }

    pub fn with_conversation(mut self, service: Arc<ConversationService>) -> Self {
        self.conversation = Some(service);
        self
    }

    pub fn with_knowledge(mut self, service: Arc<KnowledgeService>) -> Self {
        self.knowledge = Some(service);
        self
    }

    pub fn with_database(mut self, connected: bool) -> Self {
        self.db_connected = connected;
        self
    }

    pub fn agent_name(&self) -> &str {
        &self.config.agent.profile.name
    }

    pub fn agent_ready(&self) -> bool {
        self.conversation.is_some()
    }

    pub fn agent_info(&self) -> AgentInfo {
        AgentInfo::new(
            self.agent_name(),
            self.config.llm.model.clone(),
            self.agent_ready(),
        )
    }

    /// Wires the production adapters. Never fails: missing pieces leave the
    /// service running degraded.
    pub async fn bootstrap(config: AppConfig, pool: Option<PgPool>) -> Self {
        let health = Arc::new(HealthService::new(
            Arc::new(PostgresProbe::new(&config.database.url)),
            Arc::new(OllamaProbe::new(&config.llm.host)),
            config.health.cache_ttl,
        ));

        let vector_store = build_vector_store(&config, pool.as_ref()).await;
        let sessions: Arc<dyn SessionStore> = match &pool {
            Some(pool) => Arc::new(PostgresSessionStore::new(pool.clone())),
            None => {
                warn!("session memory is process-local");
                Arc::new(InMemorySessionStore::new())
            }
        };

        let rag = match OllamaEmbedding::new(
            config.llm.host.clone(),
            config.llm.embed_model.clone(),
            config.llm.embedding_dimension,
            config.llm.request_timeout,
        ) {
            Ok(embedding) => Some(Arc::new(RagService::new(
                Arc::new(embedding),
                vector_store,
                config.knowledge.top_k,
            ))),
            Err(e) => {
                error!(error = %e, "could not initialize embedder, knowledge disabled");
                None
            }
        };

        let agent = match OllamaLlm::new(
            config.llm.host.clone(),
            config.llm.model.clone(),
            config.llm.request_timeout,
        ) {
            Ok(llm) => {
                let mut agent =
                    ChatAgent::new(Arc::new(llm), config.agent.profile.clone(), config.agent.timeout);
                if let Some(rag) = &rag {
                    agent = agent.with_knowledge(rag.clone(), config.knowledge.top_k);
                }
                info!(
                    agent = agent.name(),
                    model = agent.model(),
                    timeout_secs = agent.timeout().as_secs(),
                    knowledge = rag.is_some(),
                    "agent initialized"
                );
                Some(Arc::new(agent))
            }
            Err(e) => {
                error!(error = %e, "could not initialize agent");
                None
            }
        };

        let chunk_size = config.knowledge.chunk_size;
        let mut state = Self::new(config, health).with_database(pool.is_some());
        if let Some(agent) = agent {
            state = state.with_conversation(Arc::new(
                ConversationService::new(agent).with_sessions(sessions),
            ));
        }
        if let Some(rag) = rag {
            state = state.with_knowledge(Arc::new(KnowledgeService::new(rag, chunk_size)));
        }
        state
    }
}

async fn build_vector_store(config: &AppConfig, pool: Option<&PgPool>) -> Arc<dyn VectorStore> {
    if let Some(pool) = pool {
        match PgVectorStore::new(
            pool.clone(),
            &config.database.schema,
            &config.database.table,
            config.llm.embedding_dimension,
        )
        .await
        {
            Ok(store) => return Arc::new(store),
            Err(e) => error!(error = %e, "pgvector unavailable, falling back to in-memory store"),
        }
    }
    warn!("knowledge vectors are process-local");
    Arc::new(InMemoryVectorStore::new())
}
