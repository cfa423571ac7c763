//! Start the PulseStage server.

use clap::Args;

use pulsestage_api::{Backend, run_server};
use pulsestage_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Use the process-local store instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,

    /// Skip migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.no_migrate {
        config.database.auto_migrate = false;
    }

    println!("Starting PulseStage server...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);

    let backend = if args.in_memory {
        Backend::InMemory
    } else {
        Backend::Postgres
    };
    run_server(config, backend).await
}
