//! User provisioning commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use pulsestage_core::error::AppError;
use pulsestage_entity::user::{CreateUser, User};

use super::AdminSession;
use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// Tenant slug
    #[arg(short, long)]
    pub tenant: String,

    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        /// Email address
        email: String,
        /// Display name
        name: String,
        /// Primary team slug
        #[arg(long)]
        team: Option<String>,
    },
    /// Show a user by email
    Show {
        email: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
pub(crate) struct UserRow {
    id: String,
    email: String,
    name: String,
    active: bool,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email.clone(),
            name: u.name.clone(),
            active: u.is_active,
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = AdminSession::open(config_path, &args.tenant).await?;
    let users = &session.state.stores.users;
    let ctx = &session.ctx;

    let user = match &args.command {
        UserCommand::Create { email, name, team } => {
            let primary_team_id = match team {
                Some(slug) => Some(session.state.team_service.get_by_slug(ctx, slug).await?.id),
                None => None,
            };
            let data = CreateUser {
                email: email.trim().to_lowercase(),
                name: name.clone(),
                sso_id: None,
                primary_team_id,
            };
            let user = users.create(&ctx.tenant, &data).await?;
            output::print_success(&format!("User '{}' created", user.email));
            user
        }
        UserCommand::Show { email } => users
            .find_by_email(&ctx.tenant, email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))?,
    };

    output::print_list(&[UserRow::from(&user)], format);
    session.close().await;
    Ok(())
}
