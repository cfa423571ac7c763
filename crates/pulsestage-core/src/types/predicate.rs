//! Row filters handed from the authorization layer to the persistence layer.
//!
//! A [`QueryPredicate`] always carries the tenant clause. The team clause is
//! derived from an authorization scope and can only ever narrow the result.

use std::collections::BTreeSet;

use serde::Serialize;

use super::id::{TeamId, TenantId};
use super::tenant_scope::TenantScope;

/// The team portion of a row filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "teams", rename_all = "snake_case")]
pub enum TeamFilter {
    /// Every row in the tenant, including rows without a team.
    Any,
    /// Only rows that are not assigned to a team.
    Unassigned,
    /// Only rows of one team.
    Only(TeamId),
    /// Only rows whose team is in the set. An empty set matches nothing.
    AnyOf(BTreeSet<TeamId>),
}

/// A tenant-scoped row filter: `tenant_id = T AND <team clause>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPredicate {
    tenant: TenantScope,
    teams: TeamFilter,
}

impl QueryPredicate {
    /// Build a predicate from a tenant scope and a team clause.
    pub fn new(tenant: TenantScope, teams: TeamFilter) -> Self {
        Self { tenant, teams }
    }

    /// A predicate restricted by tenant only.
    pub fn tenant_only(tenant: TenantScope) -> Self {
        Self::new(tenant, TeamFilter::Any)
    }

    /// The tenant scope; present on every predicate.
    pub fn tenant(&self) -> TenantScope {
        self.tenant
    }

    /// The tenant ID bound to the mandatory tenant clause.
    pub fn tenant_id(&self) -> TenantId {
        self.tenant.tenant_id()
    }

    /// The team clause.
    pub fn team_filter(&self) -> &TeamFilter {
        &self.teams
    }

    /// Whether the predicate can match no row at all.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(&self.teams, TeamFilter::AnyOf(set) if set.is_empty())
    }

    /// Evaluate the predicate against a row's tenant and team.
    pub fn matches(&self, tenant_id: TenantId, team_id: Option<TeamId>) -> bool {
        if !self.tenant.contains(tenant_id) {
            return false;
        }
        match (&self.teams, team_id) {
            (TeamFilter::Any, _) => true,
            (TeamFilter::Unassigned, None) => true,
            (TeamFilter::Unassigned, Some(_)) => false,
            (TeamFilter::Only(only), Some(team)) => *only == team,
            (TeamFilter::AnyOf(set), Some(team)) => set.contains(&team),
            (TeamFilter::Only(_) | TeamFilter::AnyOf(_), None) => false,
        }
    }

    /// Intersect with a caller-requested team filter (e.g. `?team=...`).
    ///
    /// The result never widens the predicate: asking for a team outside the
    /// current scope yields an unsatisfiable predicate, not an error.
    pub fn restrict_to_team(self, team_id: TeamId) -> Self {
        let teams = match &self.teams {
            TeamFilter::Any => TeamFilter::Only(team_id),
            TeamFilter::Only(only) if *only == team_id => TeamFilter::Only(team_id),
            TeamFilter::AnyOf(set) if set.contains(&team_id) => TeamFilter::Only(team_id),
            _ => TeamFilter::AnyOf(BTreeSet::new()),
        };
        Self::new(self.tenant, teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> TenantScope {
        TenantScope::new(TenantId::new())
    }

    #[test]
    fn test_tenant_clause_always_applies() {
        let predicate = QueryPredicate::tenant_only(scope());
        assert!(!predicate.matches(TenantId::new(), None));
        assert!(predicate.matches(predicate.tenant_id(), None));
    }

    #[test]
    fn test_any_of_excludes_unassigned_rows() {
        let team = TeamId::new();
        let tenant = scope();
        let predicate = QueryPredicate::new(tenant, TeamFilter::AnyOf([team].into()));
        assert!(predicate.matches(tenant.tenant_id(), Some(team)));
        assert!(!predicate.matches(tenant.tenant_id(), Some(TeamId::new())));
        assert!(!predicate.matches(tenant.tenant_id(), None));
    }

    #[test]
    fn test_restrict_outside_scope_is_unsatisfiable() {
        let tenant = scope();
        let predicate = QueryPredicate::new(tenant, TeamFilter::Only(TeamId::new()));
        let narrowed = predicate.restrict_to_team(TeamId::new());
        assert!(narrowed.is_unsatisfiable());
    }

    #[test]
    fn test_restrict_inside_scope_narrows() {
        let tenant = scope();
        let a = TeamId::new();
        let b = TeamId::new();
        let predicate = QueryPredicate::new(tenant, TeamFilter::AnyOf([a, b].into()));
        let narrowed = predicate.restrict_to_team(b);
        assert_eq!(narrowed.team_filter(), &TeamFilter::Only(b));
    }
}
