//! Tenant inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use pulsestage_core::error::AppError;
use pulsestage_entity::tenant::Tenant;

use crate::output::{self, OutputFormat};

/// Arguments for tenant commands
#[derive(Debug, Args)]
pub struct TenantArgs {
    #[command(subcommand)]
    pub command: TenantCommand,
}

/// Tenant subcommands
#[derive(Debug, Subcommand)]
pub enum TenantCommand {
    /// Show a tenant and its moderation settings
    Show {
        /// Tenant slug
        slug: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct TenantRow {
    id: String,
    slug: String,
    name: String,
    review_required: bool,
    created_at: String,
}

impl From<&Tenant> for TenantRow {
    fn from(t: &Tenant) -> Self {
        Self {
            id: t.id.to_string(),
            slug: t.slug.clone(),
            name: t.name.clone(),
            review_required: t.requires_review(),
            created_at: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute tenant commands
pub async fn execute(
    args: &TenantArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;
    let tenants = db.stores().tenants;

    let result = match &args.command {
        TenantCommand::Show { slug } => tenants
            .find_by_slug(slug)
            .await
            .and_then(|t| t.ok_or_else(|| AppError::not_found(format!("Tenant '{slug}' not found")))),
    };

    db.close().await;
    let tenant = result?;
    output::print_list(&[TenantRow::from(&tenant)], format);
    Ok(())
}
