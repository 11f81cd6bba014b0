use std::net::SocketAddr;

use agentos::api::{create_router, AppState};
use agentos::infrastructure::{
    config::redacted_dsn,
    database::{connect_with_retry, init_schema},
    telemetry::init_tracing,
    AppConfig,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("agentos=debug,tower_http=debug");

    let config = AppConfig::from_env()?;
    info!(
        agent = %config.agent.profile.name,
        model = %config.llm.model,
        ollama = %config.llm.host,
        database = %redacted_dsn(&config.database.url),
        auth = config.auth_enabled(),
        "starting"
    );
    if !config.auth_enabled() {
        warn!("API_KEY not set, protected routes are open");
    }

    let pool = connect_with_retry(
        &config.database.url,
        config.database.connect_retries,
        config.database.retry_delay,
    )
    .await;

    if let Some(pool) = &pool {
        let report = init_schema(pool).await;
        if !report.is_complete() {
            warn!(failed = report.failed.len(), "some agent tables could not be created");
        }
    }

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::bootstrap(config, pool.clone()).await;
    if !state.agent_ready() {
        warn!("agent not initialized, chat endpoints will answer 503");
    }
    let app = create_router(state);

    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
