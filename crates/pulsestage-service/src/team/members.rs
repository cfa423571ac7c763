//! Team membership administration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use pulsestage_auth::rbac::{Action, AuthorizationGate, MembershipChange, Target};
use pulsestage_core::AppError;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{TeamId, UserId};
use pulsestage_database::store::{MembershipStore, TeamStore, UserStore};
use pulsestage_entity::team::{TeamMember, TeamMembership, TeamRole};

use crate::audit::{AuditEvent, AuditRecorder};
use crate::context::RequestContext;

/// Request to add a member, by user ID or email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: TeamRole,
}

/// Adds, re-roles and removes team members.
#[derive(Debug, Clone)]
pub struct MemberService {
    teams: Arc<dyn TeamStore>,
    users: Arc<dyn UserStore>,
    memberships: Arc<dyn MembershipStore>,
    gate: AuthorizationGate,
    recorder: AuditRecorder,
}

impl MemberService {
    pub fn new(
        teams: Arc<dyn TeamStore>,
        users: Arc<dyn UserStore>,
        memberships: Arc<dyn MembershipStore>,
        gate: AuthorizationGate,
        recorder: AuditRecorder,
    ) -> Self {
        Self {
            teams,
            users,
            memberships,
            gate,
            recorder,
        }
    }

    /// Members of a team. Any member of the team may look.
    pub async fn list(&self, ctx: &RequestContext, team: TeamId) -> AppResult<Vec<TeamMember>> {
        self.require_team(ctx, team).await?;
        self.gate
            .require(ctx.principal(), Action::ViewTeamMembers, &Target::team(ctx.tenant_id(), team))
            .await?;
        self.memberships.list_members(&ctx.tenant, team).await
    }

    /// The caller's own memberships.
    pub async fn mine(&self, ctx: &RequestContext) -> AppResult<Vec<TeamMembership>> {
        let user = ctx.require_user()?;
        self.memberships.list_for_user(&ctx.tenant, user).await
    }

    pub async fn add(
        &self,
        ctx: &RequestContext,
        team: TeamId,
        req: AddMemberRequest,
    ) -> AppResult<TeamMembership> {
        self.require_team(ctx, team).await?;
        self.gate
            .require(ctx.principal(), Action::ManageTeamMembers, &Target::team(ctx.tenant_id(), team))
            .await?;

        let user = match (req.user_id, req.email.as_deref()) {
            (Some(id), _) => self.users.find_by_id(&ctx.tenant, id).await?,
            (None, Some(email)) => self.users.find_by_email(&ctx.tenant, email.trim()).await?,
            (None, None) => return Err(AppError::validation("Either user_id or email is required")),
        }
        .ok_or_else(|| AppError::not_found("User not found"))?;

        let membership = self
            .memberships
            .add(&ctx.tenant, team, user.id, req.role)
            .await?;

        info!(
            tenant_id = %ctx.tenant_id(),
            team_id = %team,
            user_id = %user.id,
            role = %req.role,
            "Team member added"
        );
        self.record(ctx, "team.member_add", team, user.id, json!({ "role": req.role }));
        Ok(membership)
    }

    /// Change a member's role. The team's last owner cannot be demoted.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        team: TeamId,
        user: UserId,
        role: TeamRole,
    ) -> AppResult<TeamMembership> {
        self.require_team(ctx, team).await?;
        let target = Target::membership(ctx.tenant_id(), team, user, MembershipChange::ChangeRole(role));
        self.gate
            .require(ctx.principal(), Action::ManageTeamMembers, &target)
            .await?;
        let previous = self.require_member(ctx, team, user).await?;

        let membership = self
            .memberships
            .change_role(&ctx.tenant, team, user, role)
            .await?;

        info!(
            tenant_id = %ctx.tenant_id(),
            team_id = %team,
            user_id = %user,
            from = %previous,
            to = %role,
            "Team member role changed"
        );
        self.record(
            ctx,
            "team.member_role_change",
            team,
            user,
            json!({ "from": previous, "to": role }),
        );
        Ok(membership)
    }

    /// Remove a member. The team's last owner cannot be removed.
    pub async fn remove(&self, ctx: &RequestContext, team: TeamId, user: UserId) -> AppResult<()> {
        self.require_team(ctx, team).await?;
        let target = Target::membership(ctx.tenant_id(), team, user, MembershipChange::Remove);
        self.gate
            .require(ctx.principal(), Action::ManageTeamMembers, &target)
            .await?;
        let previous = self.require_member(ctx, team, user).await?;

        self.memberships.remove(&ctx.tenant, team, user).await?;

        info!(tenant_id = %ctx.tenant_id(), team_id = %team, user_id = %user, "Team member removed");
        self.record(ctx, "team.member_remove", team, user, json!({ "role": previous }));
        Ok(())
    }

    async fn require_team(&self, ctx: &RequestContext, team: TeamId) -> AppResult<()> {
        self.teams
            .find_by_id(&ctx.tenant, team)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Team not found"))
    }

    async fn require_member(
        &self,
        ctx: &RequestContext,
        team: TeamId,
        user: UserId,
    ) -> AppResult<TeamRole> {
        self.memberships
            .find_role(&ctx.tenant, user, team)
            .await?
            .ok_or_else(|| AppError::not_found("Membership not found"))
    }

    fn record(
        &self,
        ctx: &RequestContext,
        action: &str,
        team: TeamId,
        user: UserId,
        extra: serde_json::Value,
    ) {
        let event = AuditEvent::new(action, "team_membership", Some(team.into_uuid()))
            .with_metadata(json!({ "user_id": user, "details": extra }));
        self.recorder.record(ctx, event);
    }
}
