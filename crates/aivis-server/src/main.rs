mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use aivis_analysis::{AssessmentClient, Enricher};
use aivis_scan::ScanExecutor;
use aivis_serp::SerpClient;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(aivis_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = aivis_db::PoolConfig::from_app_config(&config);
    let pool = aivis_db::connect_pool(&config.database_url, pool_config).await?;
    aivis_db::run_migrations(&pool).await?;

    let executor = match &config.serp_api_key {
        Some(key) => Some(Arc::new(ScanExecutor::new(SerpClient::new(
            key,
            config.serp_timeout_secs,
        )?))),
        None => {
            tracing::warn!("AIVIS_SERP_API_KEY not set; scan endpoints disabled");
            None
        }
    };

    let enricher = match &config.assessment_api_key {
        Some(key) => Some(Arc::new(Enricher::new(
            pool.clone(),
            Arc::new(AssessmentClient::new(key, config.assessment_timeout_secs)?),
        ))),
        None => {
            tracing::warn!("AIVIS_ASSESSMENT_API_KEY not set; analysis enrichment disabled");
            None
        }
    };

    let _scheduler = scheduler::build_scheduler(
        pool.clone(),
        Arc::clone(&config),
        executor.clone(),
        enricher.clone(),
    )
    .await?;

    let auth = AuthState::from_env(matches!(config.env, aivis_core::Environment::Development))?;
    let app = build_app(
        AppState {
            pool,
            config: Arc::clone(&config),
            executor,
            enricher,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "aivis-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
