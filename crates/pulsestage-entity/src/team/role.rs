//! Team role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use pulsestage_core::AppError;
use pulsestage_core::error::codes::INVALID_ROLE;

/// Roles a user can hold within a single team.
///
/// Roles are totally ordered by privilege:
/// `Viewer < Member < Moderator < Admin < Owner`. A role is always held per
/// (user, team) pair; nothing here is tenant-global.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Can read the team's questions.
    Viewer,
    /// Can submit and upvote questions.
    Member,
    /// Can answer, pin, freeze and tag questions.
    Moderator,
    /// Can manage members and team settings.
    Admin,
    /// Highest role; every team that has members keeps at least one.
    Owner,
}

impl TeamRole {
    /// Every role, lowest privilege first.
    pub const ALL: [TeamRole; 5] = [
        Self::Viewer,
        Self::Member,
        Self::Moderator,
        Self::Admin,
        Self::Owner,
    ];

    /// Return the privilege rank (higher = more privileged).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Viewer => 1,
            Self::Member => 2,
            Self::Moderator => 3,
            Self::Admin => 4,
            Self::Owner => 5,
        }
    }

    /// Check if this role has at least the privileges of `threshold`.
    pub fn at_least(&self, threshold: TeamRole) -> bool {
        self.rank() >= threshold.rank()
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "member" => Ok(Self::Member),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            _ => Err(AppError::validation(format!(
                "Invalid team role: '{s}'. Expected one of: viewer, member, moderator, admin, owner"
            ))
            .with_code(INVALID_ROLE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_is_strictly_increasing() {
        for pair in TeamRole::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_at_least() {
        assert!(TeamRole::Owner.at_least(TeamRole::Viewer));
        assert!(TeamRole::Moderator.at_least(TeamRole::Moderator));
        assert!(!TeamRole::Member.at_least(TeamRole::Moderator));
    }

    #[test]
    fn test_from_str_rejects_unknown_roles() {
        assert_eq!("Owner".parse::<TeamRole>().unwrap(), TeamRole::Owner);
        let err = "superuser".parse::<TeamRole>().unwrap_err();
        assert_eq!(err.code, Some(INVALID_ROLE));
    }
}
