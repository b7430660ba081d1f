//! # Folio API Server
//!
//! REST backend for a personal portfolio and learning site: public profile
//! content, a term dictionary with videos, and quiz/practice modules for
//! logged-in visitors.
//!
//! Startup order matters: both role pools must come up (with retry) before
//! migrations run and the listener binds. There is no partial mode: if
//! either pool fails, the process exits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p folio-api
//! ```

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::{
    app::{build_router, AppState},
    config::Config,
};
use folio_shared::db::{create_pool_with_retry, run_migrations, DatabaseConfig, RolePools};

/// Interval between deny-list sweeps
const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Grace period for in-flight requests after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Folio API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    // Both pools or nothing: a missing tier would silently change the
    // privilege semantics of every request.
    let owner = create_pool_with_retry(DatabaseConfig {
        url: config.database.owner_url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    let visitor = create_pool_with_retry(DatabaseConfig {
        url: config.database.visitor_url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    let pools = RolePools::new(owner, visitor);

    // Migrations run through the owner pool; the visitor role has no DDL
    // grants.
    run_migrations(&pools.owner).await?;

    let state = AppState::new(pools, config.clone());

    // Hourly sweep keeps the deny-list bounded by logouts within one TTL
    // window.
    let purge_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        interval.tick().await; // first tick fires immediately; skip it

        loop {
            interval.tick().await;
            if let Err(e) = purge_state
                .sessions
                .purge_expired(&purge_state.pools.owner)
                .await
            {
                tracing::warn!(error = %e, "Deny-list sweep failed");
            }
        }
    });

    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Give in-flight work a bounded window to drain before pools close.
    tracing::info!(
        "Shutdown signal received, draining for up to {}s...",
        SHUTDOWN_GRACE.as_secs()
    );
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, state.pools.close()).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
