//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pulsestage_core::types::id::{TeamId, TenantId, UserId};

/// A person within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Email address, unique per tenant.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Identifier assigned by the SSO provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_id: Option<String>,
    /// Deactivation is a soft flag.
    pub is_active: bool,
    /// The user's primary team, if any.
    pub primary_team_id: Option<TeamId>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user can start a session.
    pub fn can_login(&self) -> bool {
        self.is_active
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// SSO subject, if known.
    pub sso_id: Option<String>,
    /// Primary team, if any.
    pub primary_team_id: Option<TeamId>,
}
