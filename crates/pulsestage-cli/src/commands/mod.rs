//! CLI command definitions and dispatch.

pub mod audit;
pub mod migrate;
pub mod serve;
pub mod team;
pub mod tenant;
pub mod user;

use std::time::Duration;

use clap::{Parser, Subcommand};

use pulsestage_api::AppState;
use pulsestage_auth::principal::Principal;
use pulsestage_core::config::AppConfig;
use pulsestage_core::error::AppError;
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_database::DatabasePool;
use pulsestage_service::context::RequestContext;

use crate::output::OutputFormat;

/// PulseStage: multi-tenant Q&A administration
#[derive(Debug, Parser)]
#[command(name = "pulsestage", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the PulseStage server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Tenant provisioning
    Tenant(tenant::TenantArgs),
    /// User provisioning
    User(user::UserArgs),
    /// Team and membership management
    Team(team::TeamArgs),
    /// Audit log
    Audit(audit::AuditArgs),
}

impl Cli {
    pub fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve(_))
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Tenant(args) => tenant::execute(args, &self.config, self.format).await,
            Commands::User(args) => user::execute(args, &self.config, self.format).await,
            Commands::Team(args) => team::execute(args, &self.config, self.format).await,
            Commands::Audit(args) => audit::execute(args, &self.config, self.format).await,
        }
    }
}

const AUDIT_FLUSH_GRACE: Duration = Duration::from_millis(250);

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: connect to the database without touching the schema
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    let mut database = config.database.clone();
    database.auto_migrate = false;
    DatabasePool::connect(&database).await
}

/// Services wired against PostgreSQL, acting in one tenant with the
/// bootstrap credential.
///
/// The bootstrap principal skips team role checks but still cannot remove
/// a team's last owner.
pub struct AdminSession {
    pub state: AppState,
    pub ctx: RequestContext,
    pub db: DatabasePool,
}

impl AdminSession {
    pub async fn open(config_path: &str, tenant_slug: &str) -> Result<Self, AppError> {
        let config = load_config(config_path)?;
        let db = connect(&config).await?;
        let state = AppState::new(config, db.stores(), Some(db.clone()));

        let tenant = state.tenant_service.resolve(tenant_slug).await?;
        let scope = TenantScope::new(tenant.id);
        let principal = Principal::Bootstrap { tenant: tenant.id };
        let ctx = RequestContext::new(scope, Some(principal), None);
        tracing::debug!(tenant = %tenant.slug, "Admin session opened");

        Ok(Self { state, ctx, db })
    }

    /// Give spawned audit writes a moment to land, then close the pool.
    pub async fn close(self) {
        tokio::time::sleep(AUDIT_FLUSH_GRACE).await;
        self.db.close().await;
    }
}
