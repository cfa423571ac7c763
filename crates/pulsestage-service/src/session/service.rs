//! Development login and the "who am I" view.
//!
//! Real deployments sit behind an SSO proxy; this service only turns a
//! known, active email into a signed session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use pulsestage_auth::csrf;
use pulsestage_auth::jwt::JwtEncoder;
use pulsestage_auth::principal::Principal;
use pulsestage_core::AppError;
use pulsestage_core::error::codes::NOT_AUTHENTICATED;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_database::store::{MembershipStore, UserStore};
use pulsestage_entity::team::TeamMembership;
use pulsestage_entity::user::User;

use crate::context::RequestContext;

/// A newly opened session.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub csrf_token: String,
    pub user: User,
}

/// The caller's identity and team roles.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub principal: Principal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub memberships: Vec<TeamMembership>,
}

/// Opens sessions and describes the current one.
#[derive(Debug, Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    memberships: Arc<dyn MembershipStore>,
    encoder: Arc<JwtEncoder>,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        memberships: Arc<dyn MembershipStore>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            users,
            memberships,
            encoder,
        }
    }

    /// Sign in an active user of `tenant` by email.
    pub async fn login(&self, tenant: &TenantScope, email: &str) -> AppResult<LoginResult> {
        let email = email.trim();
        let user = self
            .users
            .find_by_email(tenant, email)
            .await?
            .filter(User::can_login);
        let Some(user) = user else {
            warn!(tenant_id = %tenant.tenant_id(), "Login rejected");
            return Err(AppError::authentication("Unknown or inactive user").with_code(NOT_AUTHENTICATED));
        };

        let issued = self.encoder.issue(user.id, tenant.tenant_id())?;
        info!(tenant_id = %tenant.tenant_id(), user_id = %user.id, "Session opened");
        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
            csrf_token: csrf::generate_token(),
            user,
        })
    }

    /// Describe the caller.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<SessionInfo> {
        let principal = *ctx.principal().ok_or_else(|| {
            AppError::authentication("Authentication required").with_code(NOT_AUTHENTICATED)
        })?;
        let Some(user_id) = principal.user_id() else {
            return Ok(SessionInfo {
                principal,
                user: None,
                memberships: Vec::new(),
            });
        };

        let user = self
            .users
            .find_by_id(&ctx.tenant, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let memberships = self.memberships.list_for_user(&ctx.tenant, user_id).await?;
        Ok(SessionInfo {
            principal,
            user: Some(user),
            memberships,
        })
    }
}
