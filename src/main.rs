use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;
mod workers;

#[cfg(test)]
mod testing;

use config::settings::AppConfig;
use infrastructure::staging::StagingArea;
use infrastructure::status::redis_store::RedisStatusStore;
use infrastructure::storage::s3::StorageService;
use infrastructure::transcode::ffmpeg::FfmpegEngine;
use state::AppState;
use workers::transcoder::JobOrchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting video processing service...");

    let config = AppConfig::new().context("Missing required environment variable")?;

    let staging = StagingArea::new(&config.staging);
    staging
        .ensure_directories()
        .await
        .context("Failed to create staging directories")?;

    let status = Arc::new(
        RedisStatusStore::new(&config.redis_url)
            .await
            .context("Failed to connect to Redis")?,
    );
    let storage = Arc::new(StorageService::new(&config.storage));
    let engine = Arc::new(FfmpegEngine::new(&config.ffmpeg));

    let orchestrator = JobOrchestrator::new(
        storage,
        engine,
        status.clone(),
        staging,
        config.buckets.clone(),
    );

    let port = config.server_port;
    let app = app::create_app(AppState::new(status, orchestrator));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
