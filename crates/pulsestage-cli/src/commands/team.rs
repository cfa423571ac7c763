//! Team and membership management commands.
//!
//! Every command goes through the same services and authorization gate as
//! the HTTP API, acting with the bootstrap credential.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use pulsestage_core::error::AppError;
use pulsestage_core::types::id::UserId;
use pulsestage_entity::team::{Team, TeamMember, TeamRole};
use pulsestage_service::team::{AddMemberRequest, CreateTeamRequest};

use super::AdminSession;
use crate::output::{self, OutputFormat};

/// Arguments for team commands
#[derive(Debug, Args)]
pub struct TeamArgs {
    /// Tenant slug
    #[arg(short, long)]
    pub tenant: String,

    #[command(subcommand)]
    pub command: TeamCommand,
}

/// Team subcommands
#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    /// List teams
    List {
        /// Include deactivated teams
        #[arg(long)]
        all: bool,
    },
    /// Create a team
    Create {
        slug: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Email of the user to make the first owner
        #[arg(long)]
        owner: Option<String>,
    },
    /// List a team's members
    Members {
        /// Team slug
        team: String,
    },
    /// Add a user to a team
    AddMember {
        team: String,
        email: String,
        /// viewer, member, moderator, admin, or owner
        #[arg(long, default_value = "member")]
        role: TeamRole,
    },
    /// Change a member's role
    SetRole {
        team: String,
        email: String,
        role: TeamRole,
    },
    /// Remove a member from a team
    RemoveMember {
        team: String,
        email: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct TeamRow {
    id: String,
    slug: String,
    name: String,
    active: bool,
}

impl From<&Team> for TeamRow {
    fn from(t: &Team) -> Self {
        Self {
            id: t.id.to_string(),
            slug: t.slug.clone(),
            name: t.name.clone(),
            active: t.is_active,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct MemberRow {
    email: String,
    name: String,
    role: String,
    joined_at: String,
}

impl From<&TeamMember> for MemberRow {
    fn from(m: &TeamMember) -> Self {
        Self {
            email: m.email.clone(),
            name: m.name.clone(),
            role: m.role.to_string(),
            joined_at: m.joined_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Execute team commands
pub async fn execute(
    args: &TeamArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = AdminSession::open(config_path, &args.tenant).await?;
    let result = run(&session, &args.command, format).await;
    session.close().await;
    result
}

async fn run(session: &AdminSession, command: &TeamCommand, format: OutputFormat) -> Result<(), AppError> {
    let ctx = &session.ctx;
    let teams = &session.state.team_service;
    let members = &session.state.member_service;

    match command {
        TeamCommand::List { all } => {
            let list = teams.list(ctx, *all).await?;
            let rows: Vec<TeamRow> = list.iter().map(TeamRow::from).collect();
            output::print_list(&rows, format);
        }
        TeamCommand::Create {
            slug,
            name,
            description,
            owner,
        } => {
            let team = teams
                .create(
                    ctx,
                    CreateTeamRequest {
                        slug: slug.clone(),
                        name: name.clone(),
                        description: description.clone(),
                    },
                )
                .await?;
            output::print_success(&format!("Team '{}' created", team.slug));
            if let Some(email) = owner {
                let req = AddMemberRequest {
                    user_id: None,
                    email: Some(email.clone()),
                    role: TeamRole::Owner,
                };
                members.add(ctx, team.id, req).await?;
                output::print_kv("Owner", email);
            }
            output::print_list(&[TeamRow::from(&team)], format);
        }
        TeamCommand::Members { team } => {
            let team = teams.get_by_slug(ctx, team).await?;
            let list = members.list(ctx, team.id).await?;
            let rows: Vec<MemberRow> = list.iter().map(MemberRow::from).collect();
            output::print_list(&rows, format);
        }
        TeamCommand::AddMember { team, email, role } => {
            let team = teams.get_by_slug(ctx, team).await?;
            let req = AddMemberRequest {
                user_id: None,
                email: Some(email.clone()),
                role: *role,
            };
            members.add(ctx, team.id, req).await?;
            output::print_success(&format!("{email} added to '{}' as {role}", team.slug));
        }
        TeamCommand::SetRole { team, email, role } => {
            let team = teams.get_by_slug(ctx, team).await?;
            let user = user_by_email(session, email).await?;
            members.change_role(ctx, team.id, user, *role).await?;
            output::print_success(&format!("{email} is now {role} in '{}'", team.slug));
        }
        TeamCommand::RemoveMember { team, email, force } => {
            let team = teams.get_by_slug(ctx, team).await?;
            let user = user_by_email(session, email).await?;
            if !*force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Remove {email} from '{}'?", team.slug))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            members.remove(ctx, team.id, user).await?;
            output::print_success(&format!("{email} removed from '{}'", team.slug));
        }
    }
    Ok(())
}

async fn user_by_email(session: &AdminSession, email: &str) -> Result<UserId, AppError> {
    session
        .state
        .stores
        .users
        .find_by_email(&session.ctx.tenant, email)
        .await?
        .map(|u| u.id)
        .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))
}
