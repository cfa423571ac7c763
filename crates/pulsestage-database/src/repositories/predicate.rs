//! Renders a [`QueryPredicate`] into SQL.

use sqlx::{Postgres, QueryBuilder};

use pulsestage_core::types::id::TeamId;
use pulsestage_core::types::predicate::{QueryPredicate, TeamFilter};

/// Append `<alias>.tenant_id = $n [AND <team clause>]` to the builder.
///
/// The tenant clause is written first and unconditionally.
pub fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &QueryPredicate, alias: &str) {
    qb.push(format!("{alias}.tenant_id = "))
        .push_bind(predicate.tenant_id());

    match predicate.team_filter() {
        TeamFilter::Any => {}
        TeamFilter::Unassigned => {
            qb.push(format!(" AND {alias}.team_id IS NULL"));
        }
        TeamFilter::Only(team) => {
            qb.push(format!(" AND {alias}.team_id = "))
                .push_bind(*team);
        }
        TeamFilter::AnyOf(teams) => {
            let teams: Vec<TeamId> = teams.iter().copied().collect();
            qb.push(format!(" AND {alias}.team_id = ANY("))
                .push_bind(teams)
                .push(")");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsestage_core::types::id::TenantId;
    use pulsestage_core::types::tenant_scope::TenantScope;

    fn render(predicate: &QueryPredicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM questions q WHERE ");
        push_predicate(&mut qb, predicate, "q");
        qb.sql().to_string()
    }

    #[test]
    fn test_tenant_only() {
        let p = QueryPredicate::tenant_only(TenantScope::new(TenantId::new()));
        assert_eq!(render(&p), "SELECT * FROM questions q WHERE q.tenant_id = $1");
    }

    #[test]
    fn test_team_set_uses_any() {
        let scope = TenantScope::new(TenantId::new());
        let p = QueryPredicate::new(scope, TeamFilter::AnyOf([TeamId::new()].into()));
        assert_eq!(
            render(&p),
            "SELECT * FROM questions q WHERE q.tenant_id = $1 AND q.team_id = ANY($2)"
        );
    }

    #[test]
    fn test_unassigned() {
        let scope = TenantScope::new(TenantId::new());
        let p = QueryPredicate::new(scope, TeamFilter::Unassigned);
        assert!(render(&p).ends_with("q.tenant_id = $1 AND q.team_id IS NULL"));
    }
}
