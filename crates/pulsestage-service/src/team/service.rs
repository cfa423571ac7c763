//! Team lifecycle and settings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use pulsestage_auth::rbac::{Action, AuthorizationGate, Target};
use pulsestage_core::AppError;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::TeamId;
use pulsestage_database::store::TeamStore;
use pulsestage_entity::team::model::is_valid_slug;
use pulsestage_entity::team::{CreateTeam, Team};

use crate::audit::{AuditEvent, AuditRecorder};
use crate::context::RequestContext;

/// Request to create a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Manages teams within the request's tenant.
#[derive(Debug, Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamStore>,
    gate: AuthorizationGate,
    recorder: AuditRecorder,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamStore>, gate: AuthorizationGate, recorder: AuditRecorder) -> Self {
        Self {
            teams,
            gate,
            recorder,
        }
    }

    /// List active teams. Deactivated teams are included only for callers
    /// who may manage team settings somewhere in the tenant.
    pub async fn list(&self, ctx: &RequestContext, include_inactive: bool) -> AppResult<Vec<Team>> {
        if include_inactive {
            self.gate
                .require(
                    ctx.principal(),
                    Action::ManageTeamSettings,
                    &Target::all_teams(ctx.tenant_id()),
                )
                .await?;
        }
        self.teams.list(&ctx.tenant, include_inactive).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: TeamId) -> AppResult<Team> {
        self.teams
            .find_by_id(&ctx.tenant, id)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))
    }

    pub async fn get_by_slug(&self, ctx: &RequestContext, slug: &str) -> AppResult<Team> {
        self.teams
            .find_by_slug(&ctx.tenant, &slug.to_lowercase())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Team '{slug}' not found")))
    }

    /// Create a team. A signed-in creator becomes its first owner.
    pub async fn create(&self, ctx: &RequestContext, req: CreateTeamRequest) -> AppResult<Team> {
        self.gate
            .require(ctx.principal(), Action::CreateTeam, &Target::all_teams(ctx.tenant_id()))
            .await?;

        let slug = req.slug.trim().to_lowercase();
        if !is_valid_slug(&slug) {
            return Err(AppError::validation(
                "Team slug must be lowercase letters, digits and single dashes",
            ));
        }
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Team name cannot be empty"));
        }

        let data = CreateTeam {
            slug,
            name: name.to_string(),
            description: req.description.filter(|d| !d.trim().is_empty()),
        };
        let team = self.teams.create(&ctx.tenant, &data, ctx.user_id()).await?;

        info!(tenant_id = %ctx.tenant_id(), team_id = %team.id, slug = %team.slug, "Team created");
        self.recorder.record(
            ctx,
            AuditEvent::new("team.create", "team", Some(team.id.into_uuid()))
                .with_metadata(json!({ "slug": team.slug })),
        );
        Ok(team)
    }

    /// Replace the team's settings object.
    pub async fn update_settings(
        &self,
        ctx: &RequestContext,
        id: TeamId,
        settings: serde_json::Value,
    ) -> AppResult<Team> {
        if !settings.is_object() {
            return Err(AppError::validation("Team settings must be a JSON object"));
        }
        self.authorize_manage(ctx, id).await?;
        let team = self.teams.update_settings(&ctx.tenant, id, settings).await?;
        self.recorder.record(
            ctx,
            AuditEvent::new("team.settings_update", "team", Some(id.into_uuid())),
        );
        Ok(team)
    }

    /// Activate or deactivate a team.
    pub async fn set_active(&self, ctx: &RequestContext, id: TeamId, active: bool) -> AppResult<Team> {
        self.authorize_manage(ctx, id).await?;
        let team = self.teams.set_active(&ctx.tenant, id, active).await?;

        info!(tenant_id = %ctx.tenant_id(), team_id = %id, active, "Team activation changed");
        let action = if active { "team.activate" } else { "team.deactivate" };
        self.recorder
            .record(ctx, AuditEvent::new(action, "team", Some(id.into_uuid())));
        Ok(team)
    }

    async fn authorize_manage(&self, ctx: &RequestContext, id: TeamId) -> AppResult<()> {
        self.get(ctx, id).await?;
        self.gate
            .require(ctx.principal(), Action::ManageTeamSettings, &Target::team(ctx.tenant_id(), id))
            .await
            .map(|_| ())
    }
}
