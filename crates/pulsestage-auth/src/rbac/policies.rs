//! The permission matrix: every privileged action and the team role it needs.
//!
//! [`Action::requirement`] is an exhaustive `match`, so a new action cannot
//! be added without choosing its requirement.

use std::fmt;

use serde::{Deserialize, Serialize};

use pulsestage_entity::team::TeamRole;

/// Operations accepted by the bulk moderation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOp {
    Pin,
    Unpin,
    Freeze,
    Unfreeze,
    Delete,
}

impl BulkOp {
    /// Return the operation as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pin => "pin",
            Self::Unpin => "unpin",
            Self::Freeze => "freeze",
            Self::Unfreeze => "unfreeze",
            Self::Delete => "delete",
        }
    }
}

/// A privileged action gated by team role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Question moderation
    RespondToQuestion,
    ApproveQuestion,
    PinQuestion,
    FreezeQuestion,
    TagQuestion,
    BulkTag,
    BulkAction(BulkOp),
    ViewModerationQueue,
    ViewModerationStats,

    // Team administration
    ViewTeamMembers,
    ManageTeamMembers,
    ManageTeamSettings,
    CreateTeam,
    RemoveLastOwner,

    // Tenant-wide
    CreateTag,
    ViewAuditLog,
}

/// What an action requires of the actor's role in the target team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Allowed when the effective role is at least this role.
    AtLeast(TeamRole),
    /// Never allowed, for any role or credential.
    Forbidden,
}

impl Action {
    /// Every action, for exhaustive property checks.
    pub const ALL: [Action; 20] = [
        Self::RespondToQuestion,
        Self::ApproveQuestion,
        Self::PinQuestion,
        Self::FreezeQuestion,
        Self::TagQuestion,
        Self::BulkTag,
        Self::BulkAction(BulkOp::Pin),
        Self::BulkAction(BulkOp::Unpin),
        Self::BulkAction(BulkOp::Freeze),
        Self::BulkAction(BulkOp::Unfreeze),
        Self::BulkAction(BulkOp::Delete),
        Self::ViewModerationQueue,
        Self::ViewModerationStats,
        Self::ViewTeamMembers,
        Self::ManageTeamMembers,
        Self::ManageTeamSettings,
        Self::CreateTeam,
        Self::RemoveLastOwner,
        Self::CreateTag,
        Self::ViewAuditLog,
    ];

    /// The requirement this action places on the actor.
    pub const fn requirement(self) -> Requirement {
        use TeamRole::{Admin, Moderator, Viewer};

        match self {
            Self::RespondToQuestion
            | Self::ApproveQuestion
            | Self::PinQuestion
            | Self::FreezeQuestion
            | Self::TagQuestion
            | Self::BulkTag
            | Self::BulkAction(BulkOp::Pin | BulkOp::Unpin | BulkOp::Freeze | BulkOp::Unfreeze)
            | Self::ViewModerationQueue
            | Self::ViewModerationStats
            | Self::CreateTag => Requirement::AtLeast(Moderator),

            Self::BulkAction(BulkOp::Delete)
            | Self::ManageTeamMembers
            | Self::ManageTeamSettings
            | Self::CreateTeam
            | Self::ViewAuditLog => Requirement::AtLeast(Admin),

            Self::ViewTeamMembers => Requirement::AtLeast(Viewer),

            Self::RemoveLastOwner => Requirement::Forbidden,
        }
    }

    /// The minimum role, or `None` for forbidden actions.
    pub const fn required_role(self) -> Option<TeamRole> {
        match self.requirement() {
            Requirement::AtLeast(role) => Some(role),
            Requirement::Forbidden => None,
        }
    }

    /// Whether `role` satisfies this action's requirement.
    pub fn is_permitted_by_role(self, role: TeamRole) -> bool {
        match self.requirement() {
            Requirement::AtLeast(required) => role.at_least(required),
            Requirement::Forbidden => false,
        }
    }

    /// Dotted name used in logs and audit entries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RespondToQuestion => "question.respond",
            Self::ApproveQuestion => "question.approve",
            Self::PinQuestion => "question.pin",
            Self::FreezeQuestion => "question.freeze",
            Self::TagQuestion => "question.tag",
            Self::BulkTag => "question.bulk_tag",
            Self::BulkAction(BulkOp::Pin) => "question.bulk_pin",
            Self::BulkAction(BulkOp::Unpin) => "question.bulk_unpin",
            Self::BulkAction(BulkOp::Freeze) => "question.bulk_freeze",
            Self::BulkAction(BulkOp::Unfreeze) => "question.bulk_unfreeze",
            Self::BulkAction(BulkOp::Delete) => "question.bulk_delete",
            Self::ViewModerationQueue => "moderation.queue",
            Self::ViewModerationStats => "moderation.stats",
            Self::ViewTeamMembers => "team.view_members",
            Self::ManageTeamMembers => "team.manage_members",
            Self::ManageTeamSettings => "team.manage_settings",
            Self::CreateTeam => "team.create",
            Self::RemoveLastOwner => "team.remove_last_owner",
            Self::CreateTag => "tag.create",
            Self::ViewAuditLog => "audit.view",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_matches_published_table() {
        use TeamRole::{Admin, Moderator};
        assert_eq!(Action::RespondToQuestion.required_role(), Some(Moderator));
        assert_eq!(Action::BulkTag.required_role(), Some(Moderator));
        assert_eq!(Action::BulkAction(BulkOp::Unfreeze).required_role(), Some(Moderator));
        assert_eq!(Action::BulkAction(BulkOp::Delete).required_role(), Some(Admin));
        assert_eq!(Action::ViewModerationStats.required_role(), Some(Moderator));
        assert_eq!(Action::ManageTeamMembers.required_role(), Some(Admin));
        assert_eq!(Action::ManageTeamSettings.required_role(), Some(Admin));
        assert_eq!(Action::RemoveLastOwner.requirement(), Requirement::Forbidden);
    }

    #[test]
    fn test_forbidden_denies_even_owners() {
        assert!(!Action::RemoveLastOwner.is_permitted_by_role(TeamRole::Owner));
    }

    #[test]
    fn test_permission_is_monotonic_in_role() {
        for action in Action::ALL {
            for pair in TeamRole::ALL.windows(2) {
                if action.is_permitted_by_role(pair[0]) {
                    assert!(action.is_permitted_by_role(pair[1]), "{action} not monotonic");
                }
            }
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Action::ALL.iter().map(Action::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Action::ALL.len());
    }
}
