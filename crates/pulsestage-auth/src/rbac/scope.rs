//! Authorization scopes and the scoped query builder.

use std::collections::BTreeSet;

use serde::Serialize;

use pulsestage_core::types::id::TeamId;
use pulsestage_core::types::predicate::{QueryPredicate, TeamFilter};
use pulsestage_core::types::tenant_scope::TenantScope;

/// The rows an allowed action may touch, within the request's tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "teams", rename_all = "snake_case")]
pub enum Scope {
    /// Every row in the tenant. Only the bootstrap credential gets this.
    Global,
    /// Rows of one team.
    SingleTeam(TeamId),
    /// Rows with no team.
    Unassigned,
    /// Rows of any team in the set.
    Teams(BTreeSet<TeamId>),
}

impl Scope {
    /// Whether a row in `team` falls inside the scope.
    pub fn covers(&self, team: Option<TeamId>) -> bool {
        match (self, team) {
            (Self::Global, _) => true,
            (Self::SingleTeam(only), Some(team)) => *only == team,
            (Self::Unassigned, None) => true,
            (Self::Teams(set), Some(team)) => set.contains(&team),
            _ => false,
        }
    }
}

/// Builds persistence predicates from scopes for one tenant.
#[derive(Debug, Clone, Copy)]
pub struct ScopedQueryBuilder {
    tenant: TenantScope,
}

impl ScopedQueryBuilder {
    /// A builder bound to the request's tenant.
    pub fn new(tenant: TenantScope) -> Self {
        Self { tenant }
    }

    /// Translate a scope into a predicate. The tenant clause is always set.
    pub fn build_filter(&self, scope: &Scope) -> QueryPredicate {
        let teams = match scope {
            Scope::Global => TeamFilter::Any,
            Scope::SingleTeam(team) => TeamFilter::Only(*team),
            Scope::Unassigned => TeamFilter::Unassigned,
            Scope::Teams(set) => TeamFilter::AnyOf(set.clone()),
        };
        QueryPredicate::new(self.tenant, teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsestage_core::types::id::TenantId;

    #[test]
    fn test_every_filter_keeps_tenant_clause() {
        let tenant = TenantScope::new(TenantId::new());
        let builder = ScopedQueryBuilder::new(tenant);
        let team = TeamId::new();
        for scope in [
            Scope::Global,
            Scope::SingleTeam(team),
            Scope::Unassigned,
            Scope::Teams([team].into()),
        ] {
            let predicate = builder.build_filter(&scope);
            assert_eq!(predicate.tenant_id(), tenant.tenant_id());
            assert!(!predicate.matches(TenantId::new(), Some(team)));
        }
    }

    #[test]
    fn test_scope_and_predicate_agree() {
        let tenant = TenantScope::new(TenantId::new());
        let builder = ScopedQueryBuilder::new(tenant);
        let (a, b) = (TeamId::new(), TeamId::new());
        let scope = Scope::Teams([a].into());
        let predicate = builder.build_filter(&scope);
        for team in [Some(a), Some(b), None] {
            assert_eq!(scope.covers(team), predicate.matches(tenant.tenant_id(), team));
        }
    }
}
