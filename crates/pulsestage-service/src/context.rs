//! Request context carrying the resolved tenant and the caller's identity.

use chrono::{DateTime, Utc};

use pulsestage_auth::principal::Principal;
use pulsestage_core::AppError;
use pulsestage_core::error::codes::NOT_AUTHENTICATED;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{TenantId, UserId};
use pulsestage_core::types::tenant_scope::TenantScope;

/// Context for the current request.
///
/// Built by the HTTP layer after tenant resolution and authentication and
/// passed into every service method, so each operation knows *where* it
/// runs and *who* is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Tenant resolved from the host or the development header.
    pub tenant: TenantScope,
    /// Authenticated identity, if any.
    pub principal: Option<Principal>,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(tenant: TenantScope, principal: Option<Principal>, ip_address: Option<String>) -> Self {
        Self {
            tenant,
            principal,
            ip_address,
            request_time: Utc::now(),
        }
    }

    /// A context with no identity.
    pub fn anonymous(tenant: TenantScope) -> Self {
        Self::new(tenant, None, None)
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant.tenant_id()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The acting user, if the caller is a signed-in member.
    pub fn user_id(&self) -> Option<UserId> {
        self.principal.and_then(|p| p.user_id())
    }

    /// The acting user, or a 401 error.
    pub fn require_user(&self) -> AppResult<UserId> {
        self.user_id().ok_or_else(|| {
            AppError::authentication("A signed-in user is required").with_code(NOT_AUTHENTICATED)
        })
    }

    pub fn is_bootstrap(&self) -> bool {
        self.principal.is_some_and(|p| p.is_bootstrap())
    }
}
