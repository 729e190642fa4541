use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gig_recommender::{
    api::{create_router, AppState},
    config::Config,
    services::{CatalogIndex, RecommenderEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let fallback = Some(config.fallback_category.as_str());
    let catalog = match &config.catalog_path {
        Some(path) => CatalogIndex::from_path(path, fallback)
            .with_context(|| format!("Failed to load catalog from {}", path))?,
        None => CatalogIndex::bundled(fallback).context("Failed to load bundled catalog")?,
    };

    let mut engine = RecommenderEngine::new(Arc::new(catalog));

    if config.restore_snapshot && Path::new(&config.snapshot_path).exists() {
        match engine.restore_snapshot(&config.snapshot_path) {
            Ok(summary) => tracing::info!(profiles = summary.profiles, "Restored previous state"),
            Err(e) => tracing::warn!(error = %e, "Starting without previous state"),
        }
    }

    let state = AppState::new(engine, &config.snapshot_path);
    let app = create_router(state.clone());

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if config.save_snapshot_on_shutdown {
        let engine = state.engine.read().await;
        if let Err(e) = engine.save_snapshot(&config.snapshot_path) {
            tracing::error!(error = %e, "Failed to save snapshot on shutdown");
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gig_recommender=debug,tower_http=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
