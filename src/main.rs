//! Server binary.
//!
//! Wires up:
//! - Filesystem areas (uploads, streams)
//! - JSON stream registry
//! - ffmpeg transcoder
//! - HTTP surface

use anyhow::Context;
use std::sync::Arc;
use streamhls::ports::registry::StreamRegistry;
use streamhls::{router, FfmpegTranscoder, JsonFileRegistry, MediaStore, PublishService, ServerConfig};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    // 1. Adapters
    let store = MediaStore::new(config.uploads_dir.clone(), config.streams_dir.clone());
    store
        .prepare()
        .await
        .context("failed to create uploads/streams directories")?;

    let registry = Arc::new(JsonFileRegistry::new(config.registry_path.clone()));
    registry
        .init()
        .await
        .context("failed to initialize stream registry")?;

    let transcoder = Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone()));

    // 2. Application service
    let publisher = Arc::new(PublishService::new(
        store,
        registry,
        transcoder,
        config.public_base_url.clone(),
    ));

    // 3. HTTP layer
    let app = router(&config, publisher);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!(
        "Server is running on http://{} (public base {})",
        config.bind_addr(),
        config.public_base_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
