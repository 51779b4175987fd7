use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vod_cache::VideoCache;
use vod_cache::origin::OriginClient;
use vod_cache::store::ChunkStore;
use vod_cache::store::redis::RedisChunkStore;
use vod_server::config::AppConfig;
use vod_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let store = Arc::new(
        RedisChunkStore::open(
            &config.store.url(),
            Duration::from_secs(config.store.connect_timeout_secs),
        )
        .context("Invalid chunk store settings")?,
    );
    info!(
        host = %config.store.host,
        port = config.store.port,
        db = config.store.db,
        "Chunk store configured"
    );

    let origin = OriginClient::new(&config.origin).context("Failed to build origin client")?;
    info!(base_url = %origin.base_url(), "Origin configured");

    let cache = Arc::new(VideoCache::new(
        store.clone(),
        origin,
        config.cache.chunk_size_bytes,
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config: Arc::new(config),
        cache,
    };
    let app = vod_server::build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    info!("Shutdown signal received");
}
