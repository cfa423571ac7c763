//! The authorization gate: one decision function for every privileged
//! request.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{TeamId, UserId};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_database::store::MembershipStore;
use pulsestage_entity::team::TeamRole;

use super::decision::{Decision, DenyReason};
use super::policies::{Action, Requirement};
use super::resolver::TeamMembershipResolver;
use super::scope::Scope;
use super::target::{Resource, Target};
use crate::principal::Principal;

/// Decides whether an actor may perform an action on a target, and if so
/// which rows the follow-up query may touch.
///
/// Membership state is read fresh on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    resolver: TeamMembershipResolver,
}

impl AuthorizationGate {
    pub fn new(memberships: Arc<dyn MembershipStore>) -> Self {
        Self {
            resolver: TeamMembershipResolver::new(memberships),
        }
    }

    /// The resolver backing this gate.
    pub fn resolver(&self) -> &TeamMembershipResolver {
        &self.resolver
    }

    /// Evaluate a request.
    ///
    /// Checks run in this order: authentication, tenant boundary, the
    /// last-owner rule, the bootstrap credential, then the actor's role
    /// against the permission matrix.
    pub async fn authorize(
        &self,
        actor: Option<&Principal>,
        action: Action,
        target: &Target,
    ) -> AppResult<Decision> {
        let decision = self.evaluate(actor, action, target).await?;
        if let Decision::Deny(reason) = decision {
            debug!(
                action = %action,
                tenant_id = %target.tenant,
                actor = ?actor,
                reason = %reason,
                "Authorization denied"
            );
        }
        Ok(decision)
    }

    /// Like [`authorize`](Self::authorize), but turns a deny into an error.
    pub async fn require(
        &self,
        actor: Option<&Principal>,
        action: Action,
        target: &Target,
    ) -> AppResult<Scope> {
        self.authorize(actor, action, target).await?.into_result()
    }

    async fn evaluate(
        &self,
        actor: Option<&Principal>,
        action: Action,
        target: &Target,
    ) -> AppResult<Decision> {
        let Some(actor) = actor else {
            return Ok(Decision::Deny(DenyReason::NotAuthenticated));
        };
        if actor.tenant() != target.tenant {
            return Ok(Decision::Deny(DenyReason::CrossTenant));
        }
        let scope = TenantScope::new(target.tenant);

        let action = self.escalate_last_owner(&scope, action, target).await?;
        let required = match action.requirement() {
            Requirement::Forbidden => return Ok(Decision::Deny(DenyReason::LastOwnerProtected)),
            Requirement::AtLeast(role) => role,
        };

        let user = match actor {
            Principal::Bootstrap { .. } => return Ok(Decision::Allow(Scope::Global)),
            Principal::Member { user, .. } => *user,
        };

        match target.resource {
            Resource::AllTeams => {
                self.any_team(&scope, user, required)
                    .await
                    .map(|result| match result {
                        Ok(teams) => Decision::Allow(Scope::Teams(teams)),
                        Err(reason) => Decision::Deny(reason),
                    })
            }
            Resource::Unassigned => {
                self.any_team(&scope, user, required)
                    .await
                    .map(|result| match result {
                        Ok(_) => Decision::Allow(Scope::Unassigned),
                        Err(reason) => Decision::Deny(reason),
                    })
            }
            Resource::Team(team) | Resource::Membership { team, .. } => {
                let decision = match self.resolver.effective_role(&scope, user, team).await? {
                    None => Decision::Deny(DenyReason::NotAMember),
                    Some(held) if !held.at_least(required) => {
                        Decision::Deny(DenyReason::InsufficientRole { held, required })
                    }
                    Some(_) => Decision::Allow(Scope::SingleTeam(team)),
                };
                Ok(decision)
            }
        }
    }

    /// Replace the action with [`Action::RemoveLastOwner`] when the target
    /// membership is the team's only owner and the change would drop it.
    async fn escalate_last_owner(
        &self,
        scope: &TenantScope,
        action: Action,
        target: &Target,
    ) -> AppResult<Action> {
        let Resource::Membership { team, user, change } = target.resource else {
            return Ok(action);
        };
        if !change.drops_owner() {
            return Ok(action);
        }
        let role = self.resolver.effective_role(scope, user, team).await?;
        if role != Some(TeamRole::Owner) {
            return Ok(action);
        }
        if self.resolver.owner_count(scope, team).await? <= 1 {
            return Ok(Action::RemoveLastOwner);
        }
        Ok(action)
    }

    /// Teams in which `user` holds at least `required`.
    async fn any_team(
        &self,
        scope: &TenantScope,
        user: UserId,
        required: TeamRole,
    ) -> AppResult<Result<BTreeSet<TeamId>, DenyReason>> {
        let memberships = self.resolver.memberships(scope, user).await?;
        let Some(held) = memberships.iter().map(|m| m.role).max() else {
            return Ok(Err(DenyReason::NotAMember));
        };
        let teams: BTreeSet<_> = memberships
            .iter()
            .filter(|m| m.role.at_least(required))
            .map(|m| m.team_id)
            .collect();
        if teams.is_empty() {
            return Ok(Err(DenyReason::InsufficientRole { held, required }));
        }
        Ok(Ok(teams))
    }
}
