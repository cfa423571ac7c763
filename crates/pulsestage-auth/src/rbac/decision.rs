//! Authorization outcomes and their mapping onto [`AppError`].

use std::fmt;

use serde::Serialize;

use pulsestage_core::error::codes;
use pulsestage_core::error::{AppError, ErrorKind};
use pulsestage_core::result::AppResult;
use pulsestage_entity::team::TeamRole;

use super::scope::Scope;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// No identity was presented.
    NotAuthenticated,
    /// The actor holds no membership in the target team.
    NotAMember,
    /// The actor's role is below the action's requirement.
    InsufficientRole {
        held: TeamRole,
        required: TeamRole,
    },
    /// The change would leave a team without an owner.
    LastOwnerProtected,
    /// The target lives in a different tenant than the actor.
    CrossTenant,
}

impl DenyReason {
    /// Machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => codes::NOT_AUTHENTICATED,
            Self::NotAMember => codes::NOT_A_MEMBER,
            Self::InsufficientRole { .. } => codes::INSUFFICIENT_ROLE,
            Self::LastOwnerProtected => codes::LAST_OWNER_PROTECTED,
            Self::CrossTenant => codes::CROSS_TENANT,
        }
    }

    /// Error category; the HTTP layer derives the status from it.
    ///
    /// `CrossTenant` is reported as not-found so a caller cannot confirm that
    /// a resource exists in another tenant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated => ErrorKind::Authentication,
            Self::NotAMember | Self::InsufficientRole { .. } => ErrorKind::Authorization,
            Self::LastOwnerProtected => ErrorKind::Validation,
            Self::CrossTenant => ErrorKind::NotFound,
        }
    }

    /// Convert into the error returned to the caller.
    pub fn into_error(self) -> AppError {
        let message = match self {
            Self::NotAuthenticated => "Authentication required".to_string(),
            Self::NotAMember => "You are not a member of this team".to_string(),
            Self::InsufficientRole { held, required } => {
                format!("Role '{held}' is insufficient; '{required}' or higher is required")
            }
            Self::LastOwnerProtected => {
                "A team must keep at least one owner".to_string()
            }
            Self::CrossTenant => "Resource not found".to_string(),
        };
        AppError::new(self.kind(), message).with_code(self.code())
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The gate's verdict for one (actor, action, target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Proceed, restricted to this scope.
    Allow(Scope),
    /// Stop; nothing may be applied.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the decision allows the action.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    /// The deny reason, if any.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow(_) => None,
            Self::Deny(reason) => Some(*reason),
        }
    }

    /// Turn a deny into an error, yielding the scope on allow.
    pub fn into_result(self) -> AppResult<Scope> {
        match self {
            Self::Allow(scope) => Ok(scope),
            Self::Deny(reason) => Err(reason.into_error()),
        }
    }
}
