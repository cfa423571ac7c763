//! Effective role lookup.

use std::sync::Arc;

use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{TeamId, UserId};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_database::store::MembershipStore;
use pulsestage_entity::team::{TeamMembership, TeamRole};

/// Reads a user's role per team. Roles never carry over between teams, and
/// every lookup is bound to the caller's tenant.
#[derive(Debug, Clone)]
pub struct TeamMembershipResolver {
    memberships: Arc<dyn MembershipStore>,
}

impl TeamMembershipResolver {
    pub fn new(memberships: Arc<dyn MembershipStore>) -> Self {
        Self { memberships }
    }

    /// The user's role in `team`, or `None` without a membership row.
    pub async fn effective_role(
        &self,
        scope: &TenantScope,
        user: UserId,
        team: TeamId,
    ) -> AppResult<Option<TeamRole>> {
        self.memberships.find_role(scope, user, team).await
    }

    /// Every membership the user holds in the tenant.
    pub async fn memberships(
        &self,
        scope: &TenantScope,
        user: UserId,
    ) -> AppResult<Vec<TeamMembership>> {
        self.memberships.list_for_user(scope, user).await
    }

    /// Number of owners of `team`.
    pub async fn owner_count(&self, scope: &TenantScope, team: TeamId) -> AppResult<u64> {
        self.memberships.count_owners(scope, team).await
    }
}
