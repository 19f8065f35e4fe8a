use ahpc_website::{
    config::Config,
    content::ContentAdapter,
    i18n::DictionaryStore,
    web::{self, AppState},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ahpc_website=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting AHPC website");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Dictionaries are loaded once; a missing default dictionary stops startup
    let dictionaries = DictionaryStore::load(&config.messages_dir).with_context(|| {
        format!("Failed to load dictionaries from {}", config.messages_dir)
    })?;

    let content = ContentAdapter::from_config(&config)?;

    let state = Arc::new(
        AppState::new(
            dictionaries,
            content,
            config.revalidate_after(),
            config.revalidate_secret.clone(),
        )
        .context("Failed to compile page templates")?,
    );

    if state.revalidate_secret.is_none() {
        info!("REVALIDATE_SECRET not set, on-demand revalidation is disabled");
    }
    info!(
        "Pages are re-rendered after {} seconds",
        config.revalidate_seconds
    );

    let app = web::create_router(state, &config.static_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
