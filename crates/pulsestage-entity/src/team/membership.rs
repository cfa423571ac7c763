//! Team membership entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pulsestage_core::types::id::{TeamId, TenantId, UserId};

use super::role::TeamRole;

/// Binds a user to a team with exactly one role.
///
/// `(user_id, team_id)` is unique: a user has at most one role per team.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMembership {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// The member.
    pub user_id: UserId,
    /// The team.
    pub team_id: TeamId,
    /// The member's role in this team.
    pub role: TeamRole,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
    /// When the role last changed.
    pub updated_at: DateTime<Utc>,
}

/// A membership joined with the member's profile, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    /// The member.
    pub user_id: UserId,
    /// The member's email.
    pub email: String,
    /// The member's display name.
    pub name: String,
    /// The member's role.
    pub role: TeamRole,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}
