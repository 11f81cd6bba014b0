use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info, warn};

use crate::infrastructure::config::redacted_dsn;

/// Tables the agent runtime expects to exist.
pub const AGENT_TABLES: [(&str, &str); 5] = [
    (
        "agno_sessions",
        "CREATE TABLE IF NOT EXISTS agno_sessions (
            id SERIAL PRIMARY KEY,
            session_id TEXT UNIQUE NOT NULL,
            created_at TIMESTAMP DEFAULT NOW()
        )",
    ),
    (
        "agno_memories",
        "CREATE TABLE IF NOT EXISTS agno_memories (
            id SERIAL PRIMARY KEY,
            session_id TEXT NOT NULL,
            memory TEXT NOT NULL,
            created_at TIMESTAMP DEFAULT NOW()
        )",
    ),
    (
        "agno_metrics",
        "CREATE TABLE IF NOT EXISTS agno_metrics (
            id SERIAL PRIMARY KEY,
            session_id TEXT NOT NULL,
            metric_name TEXT NOT NULL,
            metric_value FLOAT,
            recorded_at TIMESTAMP DEFAULT NOW()
        )",
    ),
    (
        "agno_knowledge",
        "CREATE TABLE IF NOT EXISTS agno_knowledge (
            id SERIAL PRIMARY KEY,
            topic TEXT NOT NULL,
            content TEXT,
            updated_at TIMESTAMP DEFAULT NOW()
        )",
    ),
    (
        "agno_evals",
        "CREATE TABLE IF NOT EXISTS agno_evals (
            id SERIAL PRIMARY KEY,
            eval_name TEXT NOT NULL,
            result JSONB,
            run_at TIMESTAMP DEFAULT NOW()
        )",
    ),
];

#[derive(Debug, Default)]
pub struct SchemaReport {
    pub verified: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

impl SchemaReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs `op` up to `attempts` times with a fixed `delay` between failures.
pub async fn retry_fixed<T, E, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Option<T>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        match op(attempt).await {
            Ok(value) => return Some(value),
            Err(e) => {
                warn!(attempt, max = attempts, error = %e, "attempt failed");
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    None
}

/// Opens a pool, giving up after `attempts`. `None` means run degraded.
pub async fn connect_with_retry(url: &str, attempts: u32, delay: Duration) -> Option<PgPool> {
    info!(database = %redacted_dsn(url), "connecting to Postgres");

    let pool = retry_fixed(attempts, delay, |_| {
        PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
    })
    .await;

    match &pool {
        Some(_) => info!("connected to Postgres"),
        None => error!(attempts, "could not connect to Postgres, running without database"),
    }
    pool
}

/// Pool that connects on first use. Fails only on a malformed URL.
pub fn lazy_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(url)
}

/// Creates the agent tables. A failing table does not stop the others.
pub async fn init_schema(pool: &PgPool) -> SchemaReport {
    let mut report = SchemaReport::default();

    for (name, ddl) in AGENT_TABLES {
        match sqlx::query(ddl).execute(pool).await {
            Ok(_) => {
                info!(table = name, "created or verified");
                report.verified.push(name);
            }
            Err(e) => {
                error!(table = name, error = %e, "failed to create table");
                report.failed.push((name, e.to_string()));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_retry_fixed_stops_on_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry_fixed(5, Duration::from_millis(1), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err("not yet")
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_fixed_gives_up_without_trailing_sleep() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result: Option<()> = retry_fixed(3, Duration::from_millis(20), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("down") }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(40));
        assert!(elapsed < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_connect_with_retry_unreachable_returns_none() {
        let pool = connect_with_retry(
            "postgresql://ai:ai@127.0.0.1:1/ai",
            2,
            Duration::from_millis(5),
        )
        .await;
        assert!(pool.is_none());
    }

    #[test]
    fn test_agent_tables_are_idempotent_ddl() {
        for (name, ddl) in AGENT_TABLES {
            assert!(ddl.starts_with(&format!("CREATE TABLE IF NOT EXISTS {name} (")));
        }
    }
}
