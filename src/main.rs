//! Storefront Cache - background maintenance and request caching for a content site
//!
//! Runs the admin API alongside the row scheduler, session retention and expiry sweep.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_cache::api::create_router;
use storefront_cache::tasks::{
    spawn_expiry_task, InventorySource, RetentionMode, RetentionWorker, RowScheduler,
};
use storefront_cache::{AppState, Config, MemoryStore};

/// Main entry point for the storefront cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared store
/// 4. Start the row scheduler, session retention and expiry sweep
/// 5. Serve the admin API on the configured port
/// 6. On SIGINT/SIGTERM, stop every worker within the shutdown grace period
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting storefront cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: session_limit={}, clean_carts={}, port={}, row_backoff={}ms",
        config.session_limit, config.clean_carts, config.server_port, config.row_backoff_ms
    );

    let store = MemoryStore::new();
    let state = AppState::from_config(store.clone(), &config);

    // Each worker gets its own store handle
    let retention_mode = if config.clean_carts {
        RetentionMode::SessionsAndCarts
    } else {
        RetentionMode::Sessions
    };
    let workers = vec![
        RowScheduler::new(store.handle(), InventorySource)
            .with_backoff(config.row_backoff())
            .spawn(),
        RetentionWorker::new(store.handle(), config.session_limit, retention_mode)
            .with_backoff(config.retention_backoff())
            .spawn(),
        spawn_expiry_task(store.clone(), config.cleanup_interval),
    ];
    info!("Background workers started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // A worker that outlives its grace period is fatal.
    let mut stuck = Vec::new();
    for worker in workers {
        let name = worker.name().to_string();
        if let Err(e) = worker.shutdown(config.shutdown_grace()).await {
            error!(worker = %name, error = %e, "Worker failed to stop");
            stuck.push(name);
        }
    }
    if !stuck.is_empty() {
        anyhow::bail!("workers still running after shutdown: {}", stuck.join(", "));
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
