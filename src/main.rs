//! PulseStage server: multi-tenant Q&A with team-scoped access control.
//!
//! Loads configuration, initializes logging, and runs the HTTP server on
//! PostgreSQL. Use `pulsestage serve --in-memory` for a throwaway instance.

use tracing_subscriber::{EnvFilter, fmt};

use pulsestage_api::{Backend, run_server};
use pulsestage_core::config::AppConfig;
use pulsestage_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!("Starting PulseStage v{}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = run_server(config, Backend::Postgres).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay, and `PULSESTAGE__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("PULSESTAGE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
