//! Review Assignment Server binary.

use std::net::SocketAddr;

use review_server::{config::Config, create_app, create_state, init_tracing};
use review_store::{MemoryReviewStore, PostgresReviewStore, ReviewStore};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    info!(
        uses_database = config.uses_database(),
        operation_timeout_secs = config.operation_timeout.as_secs(),
        "Starting Review Assignment Server"
    );

    match config.database_url.clone() {
        Some(url) => {
            let store = PostgresReviewStore::connect(&url, config.db_max_connections).await?;
            store.init().await?;
            info!("Connected to PostgreSQL");
            serve(config, store).await
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store");
            serve(config, MemoryReviewStore::new()).await
        }
    }
}

async fn serve<S: ReviewStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let addr: SocketAddr = config.server_addr().parse()?;
    let app = create_app(create_state(config, store));

    info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
