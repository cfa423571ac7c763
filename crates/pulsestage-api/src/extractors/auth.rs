//! Identity extractors.
//!
//! Credentials are tried in a fixed order: the bootstrap admin key header,
//! a `Bearer` token, then the session cookie. Only cookie-authenticated
//! mutating requests go through the CSRF check, and only once the session
//! itself has been accepted, so a missing identity is always a 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method};
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use tracing::debug;

use pulsestage_auth::csrf;
use pulsestage_auth::principal::Principal;
use pulsestage_core::AppError;
use pulsestage_core::error::codes::{CROSS_TENANT, NOT_AUTHENTICATED, TENANT_UNRESOLVED};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::user::User;
use pulsestage_service::context::RequestContext;

use crate::error::ApiError;
use crate::middleware::tenant::ResolvedTenant;
use crate::state::AppState;

/// An authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

/// The caller's context, with or without an identity.
///
/// Presented credentials are still validated: a bad token is a 401, not an
/// anonymous request.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::Deref for MaybeAuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ctx = authenticate(parts, state).await?;
        if ctx.principal.is_none() {
            return Err(not_authenticated("Authentication required"));
        }
        Ok(AuthUser(ctx))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(MaybeAuthUser)
    }
}

/// Where a session token was found.
enum TokenSource {
    Header,
    Cookie,
}

async fn authenticate(parts: &mut Parts, state: &AppState) -> Result<RequestContext, ApiError> {
    let tenant = parts
        .extensions
        .get::<ResolvedTenant>()
        .map(|t| t.0)
        .ok_or_else(|| {
            ApiError(AppError::not_found("No tenant matches this request").with_code(TENANT_UNRESOLVED))
        })?;
    let ip_address = client_ip(&parts.headers);
    let auth = &state.config.auth;

    // 1. Bootstrap admin key
    if let Some(presented) = header_str(&parts.headers, &auth.admin_key_header) {
        let valid = state
            .admin_key
            .as_ref()
            .is_some_and(|key| key.verify(presented));
        if !valid {
            debug!(tenant_id = %tenant.tenant_id(), "Admin key rejected");
            return Err(not_authenticated("Invalid admin key"));
        }
        let principal = Principal::Bootstrap {
            tenant: tenant.tenant_id(),
        };
        return Ok(RequestContext::new(tenant, Some(principal), ip_address));
    }

    // 2. Bearer token, 3. session cookie
    let jar = CookieJar::from_headers(&parts.headers);
    let (token, source) = match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
        Ok(TypedHeader(Authorization(bearer))) => (bearer.token().to_string(), TokenSource::Header),
        Err(rejection) if rejection.is_missing() => match jar.get(&auth.session_cookie) {
            Some(cookie) => (cookie.value().to_string(), TokenSource::Cookie),
            None => return Ok(RequestContext::new(tenant, None, ip_address)),
        },
        Err(_) => return Err(not_authenticated("Malformed Authorization header")),
    };

    let claims = state.jwt_decoder.decode(&token)?;
    if claims.tenant_id() != tenant.tenant_id() {
        debug!(
            token_tenant = %claims.tenant_id(),
            tenant_id = %tenant.tenant_id(),
            "Session token presented to another tenant"
        );
        return Err(ApiError(
            AppError::not_found("Resource not found").with_code(CROSS_TENANT),
        ));
    }
    require_active_user(state, &tenant, &claims).await?;

    if matches!(source, TokenSource::Cookie) && auth.csrf_enabled && is_mutating(&parts.method) {
        csrf::verify(
            jar.get(&auth.csrf_cookie).map(|c| c.value()),
            header_str(&parts.headers, &auth.csrf_header),
        )?;
    }

    Ok(RequestContext::new(tenant, Some(claims.principal()), ip_address))
}

async fn require_active_user(
    state: &AppState,
    tenant: &TenantScope,
    claims: &pulsestage_auth::jwt::Claims,
) -> Result<User, ApiError> {
    state
        .stores
        .users
        .find_by_id(tenant, claims.user_id())
        .await?
        .filter(User::can_login)
        .ok_or_else(|| not_authenticated("Session is no longer valid"))
}

fn not_authenticated(message: &str) -> ApiError {
    ApiError(AppError::authentication(message).with_code(NOT_AUTHENTICATED))
}

fn is_mutating(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// First hop of `X-Forwarded-For`, if present.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 172.16.0.1"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.1"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_safe_methods_skip_csrf() {
        assert!(!is_mutating(&Method::GET));
        assert!(!is_mutating(&Method::HEAD));
        assert!(is_mutating(&Method::DELETE));
    }
}
