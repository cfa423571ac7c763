//! Tenant resolution.
//!
//! Every `/api` request except the health probe runs in exactly one tenant.
//! The tenant slug comes from, in order: the override header (when enabled
//! in config), the subdomain of `tenant.base_domain`, or `tenant.default_slug`.
//! A request naming no known tenant is rejected before any handler runs.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use pulsestage_core::AppError;
use pulsestage_core::config::TenantConfig;
use pulsestage_core::error::codes::TENANT_UNRESOLVED;
use pulsestage_core::types::tenant_scope::TenantScope;

use crate::error::ApiError;
use crate::state::AppState;

/// The tenant this request runs in, stored as a request extension.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTenant(pub TenantScope);

/// Resolve the tenant and attach it to the request.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(slug) = tenant_slug(request.headers(), &state.config.tenant) else {
        return unresolved().into_response();
    };

    let scope = match lookup(&state, &slug).await {
        Ok(scope) => scope,
        Err(err) => return err.into_response(),
    };

    debug!(tenant = %slug, tenant_id = %scope.tenant_id(), "Tenant resolved");
    request.extensions_mut().insert(ResolvedTenant(scope));
    next.run(request).await
}

async fn lookup(state: &AppState, slug: &str) -> Result<TenantScope, ApiError> {
    if let Some(scope) = state.tenant_cache.get(slug).await {
        return Ok(scope);
    }
    let tenant = state.tenant_service.resolve(slug).await?;
    let scope = TenantScope::new(tenant.id);
    state.tenant_cache.insert(slug.to_string(), scope).await;
    Ok(scope)
}

fn unresolved() -> ApiError {
    ApiError(AppError::not_found("No tenant matches this request").with_code(TENANT_UNRESOLVED))
}

/// Pick the tenant slug for a request, if any.
pub fn tenant_slug(headers: &HeaderMap, config: &TenantConfig) -> Option<String> {
    if config.allow_header_override {
        let explicit = headers
            .get(config.header_name.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(slug) = explicit {
            return Some(slug.to_ascii_lowercase());
        }
    }

    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|host| subdomain(host, &config.base_domain))
        .or_else(|| config.default_slug.clone())
}

/// `acme.pulsestage.app:443` → `acme`. Nested subdomains do not resolve.
fn subdomain(host: &str, base_domain: &str) -> Option<String> {
    let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();
    let label = host.strip_suffix(base_domain)?.strip_suffix('.')?;
    if label.is_empty() || label.contains('.') {
        return None;
    }
    Some(label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(allow_header_override: bool) -> TenantConfig {
        TenantConfig {
            allow_header_override,
            default_slug: None,
            ..TenantConfig::default()
        }
    }

    #[test]
    fn test_subdomain_parsing() {
        assert_eq!(subdomain("acme.pulsestage.app", "pulsestage.app").as_deref(), Some("acme"));
        assert_eq!(subdomain("ACME.pulsestage.app:8080", "pulsestage.app").as_deref(), Some("acme"));
        assert_eq!(subdomain("pulsestage.app", "pulsestage.app"), None);
        assert_eq!(subdomain("a.b.pulsestage.app", "pulsestage.app"), None);
        assert_eq!(subdomain("acme.example.com", "pulsestage.app"), None);
        assert_eq!(subdomain("evilpulsestage.app", "pulsestage.app"), None);
    }

    #[test]
    fn test_header_override_only_when_enabled() {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", HeaderValue::from_static("beta"));
        headers.insert(header::HOST, HeaderValue::from_static("acme.pulsestage.app"));

        assert_eq!(tenant_slug(&headers, &config(true)).as_deref(), Some("beta"));
        assert_eq!(tenant_slug(&headers, &config(false)).as_deref(), Some("acme"));
    }

    #[test]
    fn test_default_slug_fallback() {
        let headers = HeaderMap::new();
        let mut cfg = config(false);
        assert_eq!(tenant_slug(&headers, &cfg), None);
        cfg.default_slug = Some("default".to_string());
        assert_eq!(tenant_slug(&headers, &cfg).as_deref(), Some("default"));
    }
}
