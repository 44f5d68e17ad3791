mod api_doc;
mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Context;
use config::Config;
use state::AppState;
use store::{AnyStore, MemoryStore, SpannerStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments use the process environment
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_spanner_items=debug,tower_http=debug,info".into()),
        )
        .init();

    tracing::info!("rust-spanner-items starting");
    if let Ok(path) = dotenv {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let config = Config::from_env()?;
    config.log_startup();

    // Store initialisation failures abort startup
    let store = build_store(&config).await?;
    let state = AppState::new(store, config.clone());
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.server_address()))?;

    tracing::info!("Server running on http://{}", config.server_address());
    tracing::info!(
        "Swagger UI available at http://{}{}",
        config.server_address(),
        routes::SWAGGER_UI
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("rust-spanner-items stopped");
    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<AnyStore> {
    match &config.database_url {
        Some(url) => Ok(SpannerStore::connect(url, config).await?.into()),
        None if config.seed_sample_data => Ok(MemoryStore::with_sample_data().into()),
        None => Ok(MemoryStore::new().into()),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
