//! Pokedex Cache - HTTP front for the cached catalog
//!
//! Serves entities, images and the daily featured rotation from the upstream
//! catalog through the cache layer.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokedex_cache::api::create_router;
use pokedex_cache::{spawn_cleanup_task, AppState, Config, PokeApiClient, Pokedex, SessionStore};

/// Main entry point for the catalog cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the upstream client and the cached Pokedex
/// 4. Start background expiry sweep
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokedex_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pokedex cache server");

    let config = Config::from_env();
    info!(
        max_entries = config.max_entries,
        entity_ttl_minutes = config.entity_ttl_minutes,
        image_ttl_minutes = config.image_ttl_minutes,
        catalog_max_id = config.catalog_max_id,
        timezone = %config.reference_timezone,
        upstream = %config.upstream_base_url,
        port = config.server_port,
        "Configuration loaded"
    );

    let client = Arc::new(
        PokeApiClient::from_config(&config).context("failed to build upstream HTTP client")?,
    );

    let mut builder = Pokedex::builder(config.clone());
    if config.session_mirror {
        builder = builder.mirror(Arc::new(SessionStore::with_quota(
            config.session_mirror_quota_bytes,
        )));
        info!(
            quota_bytes = config.session_mirror_quota_bytes,
            "Session mirror enabled"
        );
    }
    let pokedex = builder.build(client.clone(), client);

    let cleanup_handle = spawn_cleanup_task(pokedex.context().clone(), config.cleanup_interval);
    info!("Background expiry sweep started");

    let state = AppState::from_config(pokedex, &config);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    cleanup_handle.abort();
    warn!("Expiry sweep task aborted");
}
