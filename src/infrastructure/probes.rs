use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use crate::domain::ports::DependencyProbe;

const OLLAMA_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// `SELECT 1` against Postgres.
///
/// Holds its own lazily-connected pool so it keeps probing even when the
/// startup connection never succeeded.
pub struct PostgresProbe {
    pool: Option<PgPool>,
}

impl PostgresProbe {
    pub fn new(url: &str) -> Self {
        let pool = match crate::infrastructure::database::lazy_pool(url) {
            Ok(pool) => Some(pool),
            Err(e) => {
                error!(error = %e, "invalid database URL, database probe always fails");
                None
            }
        };
        Self { pool }
    }
}

#[async_trait]
impl DependencyProbe for PostgresProbe {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };
        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "database health check failed");
                false
            }
        }
    }
}

/// `GET /api/tags` on the inference daemon. Reachable iff it answers 200.
pub struct OllamaProbe {
    client: reqwest::Client,
    url: String,
}

impl OllamaProbe {
    pub fn new(host: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{host}/api/tags"),
        }
    }
}

#[async_trait]
impl DependencyProbe for OllamaProbe {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn ping(&self) -> bool {
        match self
            .client
            .get(&self.url)
            .timeout(OLLAMA_PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status() == reqwest::StatusCode::OK,
            Err(e) => {
                error!(error = %e, url = %self.url, "ollama health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_postgres_probe_unreachable_is_false() {
        let probe = PostgresProbe::new("postgresql://ai:ai@127.0.0.1:1/ai");
        assert!(!probe.ping().await);
    }

    #[tokio::test]
    async fn test_postgres_probe_bad_url_is_false() {
        let probe = PostgresProbe::new("not-a-database-url");
        assert!(!probe.ping().await);
    }

    #[tokio::test]
    async fn test_ollama_probe_unreachable_is_false() {
        let probe = OllamaProbe::new("http://127.0.0.1:1");
        assert_eq!(probe.name(), "ollama");
        assert!(!probe.ping().await);
    }
}
