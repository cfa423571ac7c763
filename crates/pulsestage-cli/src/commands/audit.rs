//! Audit log commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use pulsestage_core::error::AppError;
use pulsestage_core::types::pagination::PageRequest;
use pulsestage_database::store::AuditFilter;
use pulsestage_entity::audit::AuditLogEntry;

use super::AdminSession;
use crate::output::{self, OutputFormat};

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Tenant slug
    #[arg(short, long)]
    pub tenant: String,

    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// List recent entries, newest first
    List {
        /// Only entries with this action, e.g. `team.member_role_change`
        #[arg(short, long)]
        action: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Entries per page
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    created_at: String,
    action: String,
    actor: String,
    entity: String,
}

impl From<&AuditLogEntry> for AuditRow {
    fn from(e: &AuditLogEntry) -> Self {
        Self {
            created_at: e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            action: e.action.clone(),
            actor: e
                .actor_id
                .map_or_else(|| "admin-key".to_string(), |id| id.to_string()),
            entity: match e.entity_id {
                Some(id) => format!("{}:{id}", e.entity_type),
                None => e.entity_type.clone(),
            },
        }
    }
}

/// Execute audit commands
pub async fn execute(
    args: &AuditArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = AdminSession::open(config_path, &args.tenant).await?;

    let result = match &args.command {
        AuditCommand::List {
            action,
            page,
            limit,
        } => {
            let filter = AuditFilter {
                action: action.clone(),
                actor_id: None,
            };
            session
                .state
                .audit_service
                .list(&session.ctx, filter, PageRequest::new(*page, *limit))
                .await
        }
    };

    let outcome = result.map(|entries| {
        let rows: Vec<AuditRow> = entries.items.iter().map(AuditRow::from).collect();
        output::print_list(&rows, format);
        if entries.has_next() {
            println!("(page {} of {})", entries.page, entries.total_pages);
        }
    });
    session.close().await;
    outcome
}
