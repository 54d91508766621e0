mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use placecrawl_engine::{CrawlEngine, CrawlerSettings, EngineConfig, LlmEngine, PlaceCrawler};

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = placecrawl_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(config = ?config, "starting placecrawl service");

    let engine = Arc::new(LlmEngine::new(EngineConfig {
        llm_api_key: config.llm_api_key.clone(),
        llm_provider: config.llm_provider.clone(),
        headless: config.browser_headless,
    })?);
    engine.start().await?;

    let crawler = Arc::new(PlaceCrawler::new(
        Arc::clone(&engine) as Arc<dyn CrawlEngine>,
        CrawlerSettings {
            page_timeout_secs: config.request_timeout_seconds,
            max_retries: config.max_retries,
        },
    ));

    let auth = AuthState::new(config.app_api_key.clone());
    let app = build_app(AppState { crawler }, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown().await?;
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
