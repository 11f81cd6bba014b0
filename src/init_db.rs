use std::time::Duration;

use agentos::infrastructure::{
    config::redacted_dsn,
    database::{connect_with_retry, init_schema, AGENT_TABLES},
    telemetry::init_tracing,
    AppConfig,
};
use tracing::{error, info};

/// Creates the agent tables once and exits. Non-zero exit on any failure.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("agentos=info,init_db=info");

    let config = AppConfig::from_env()?;
    info!(database = %redacted_dsn(&config.database.url), "initializing database");

    let Some(pool) = connect_with_retry(&config.database.url, 1, Duration::ZERO).await else {
        anyhow::bail!("could not connect to database");
    };

    let report = init_schema(&pool).await;
    pool.close().await;

    for (table, reason) in &report.failed {
        error!(table, reason = %reason, "table not created");
    }
    if !report.is_complete() {
        anyhow::bail!(
            "{} of {} tables failed",
            report.failed.len(),
            AGENT_TABLES.len()
        );
    }

    info!(tables = report.verified.len(), "database initialized");
    Ok(())
}
