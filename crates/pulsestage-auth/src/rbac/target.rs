//! What an authorization request is about.

use pulsestage_core::types::id::{TeamId, TenantId, UserId};
use pulsestage_entity::team::TeamRole;

/// A change to an existing team membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// Delete the membership.
    Remove,
    /// Replace the member's role.
    ChangeRole(TeamRole),
}

impl MembershipChange {
    /// Whether the change takes an owner out of the owner set.
    pub fn drops_owner(&self) -> bool {
        match self {
            Self::Remove => true,
            Self::ChangeRole(role) => *role != TeamRole::Owner,
        }
    }
}

/// The resource half of a [`Target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Something owned by one team (a question, the team's settings).
    Team(TeamId),
    /// A single row with no team.
    Unassigned,
    /// A listing or batch spanning every team the actor may act in.
    AllTeams,
    /// An existing membership of `user` in `team`.
    Membership {
        team: TeamId,
        user: UserId,
        change: MembershipChange,
    },
}

/// A resource together with the tenant that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub tenant: TenantId,
    pub resource: Resource,
}

impl Target {
    pub fn team(tenant: TenantId, team: TeamId) -> Self {
        Self {
            tenant,
            resource: Resource::Team(team),
        }
    }

    pub fn all_teams(tenant: TenantId) -> Self {
        Self {
            tenant,
            resource: Resource::AllTeams,
        }
    }

    /// Target for a question, which may or may not belong to a team.
    pub fn question(tenant: TenantId, team: Option<TeamId>) -> Self {
        let resource = match team {
            Some(team) => Resource::Team(team),
            None => Resource::Unassigned,
        };
        Self { tenant, resource }
    }

    pub fn membership(tenant: TenantId, team: TeamId, user: UserId, change: MembershipChange) -> Self {
        Self {
            tenant,
            resource: Resource::Membership { team, user, change },
        }
    }
}
