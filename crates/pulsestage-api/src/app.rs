//! Application builder and server entry point.

use axum::Router;
use tracing::{info, warn};

use pulsestage_core::config::AppConfig;
use pulsestage_core::error::AppError;
use pulsestage_database::{DatabasePool, MemoryStore};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Where the server keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    /// Process-local store; everything is lost on exit.
    InMemory,
}

/// Runs the PulseStage server until Ctrl+C.
pub async fn run_server(config: AppConfig, backend: Backend) -> Result<(), AppError> {
    info!("Starting PulseStage server...");

    let (stores, db) = match backend {
        Backend::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            (db.stores(), Some(db))
        }
        Backend::InMemory => {
            warn!("Running on the in-memory store; data will not persist");
            let store = MemoryStore::new();
            if let Some(slug) = &config.tenant.default_slug {
                let tenant = store.insert_tenant(slug, slug).await;
                info!(tenant = %tenant.slug, tenant_id = %tenant.id, "Seeded default tenant");
            }
            (store.stores(), None)
        }
    };

    if config.auth.admin_key.as_deref().is_none_or(str::is_empty) {
        info!("No admin key configured; bootstrap access is disabled");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, stores, db.clone());
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("PulseStage server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(db) = db {
        db.close().await;
    }
    info!("PulseStage server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
    info!("Shutdown signal received, starting graceful shutdown...");
}
