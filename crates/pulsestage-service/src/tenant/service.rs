//! Tenant resolution and tenant settings.

use std::sync::Arc;

use tracing::info;

use pulsestage_core::AppError;
use pulsestage_core::error::codes::{INSUFFICIENT_ROLE, NOT_AUTHENTICATED, TENANT_UNRESOLVED};
use pulsestage_core::result::AppResult;
use pulsestage_database::store::TenantStore;
use pulsestage_entity::tenant::Tenant;

use crate::audit::{AuditEvent, AuditRecorder};
use crate::context::RequestContext;

/// Tenant-level operations.
#[derive(Debug, Clone)]
pub struct TenantService {
    tenants: Arc<dyn TenantStore>,
    recorder: AuditRecorder,
}

impl TenantService {
    pub fn new(tenants: Arc<dyn TenantStore>, recorder: AuditRecorder) -> Self {
        Self { tenants, recorder }
    }

    /// Look up a tenant by slug. This is the only unscoped read.
    pub async fn resolve(&self, slug: &str) -> AppResult<Tenant> {
        self.tenants
            .find_by_slug(&slug.to_lowercase())
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Tenant '{slug}' not found")).with_code(TENANT_UNRESOLVED)
            })
    }

    /// The current tenant, for any authenticated caller.
    pub async fn current(&self, ctx: &RequestContext) -> AppResult<Tenant> {
        if ctx.principal().is_none() {
            return Err(AppError::authentication("Authentication required").with_code(NOT_AUTHENTICATED));
        }
        self.tenants.get(&ctx.tenant).await
    }

    /// Replace the tenant settings. Only the bootstrap credential may.
    pub async fn update_settings(
        &self,
        ctx: &RequestContext,
        settings: serde_json::Value,
    ) -> AppResult<Tenant> {
        match ctx.principal() {
            None => {
                return Err(
                    AppError::authentication("Authentication required").with_code(NOT_AUTHENTICATED)
                );
            }
            Some(p) if !p.is_bootstrap() => {
                return Err(AppError::authorization(
                    "Tenant settings can only be changed with the admin key",
                )
                .with_code(INSUFFICIENT_ROLE));
            }
            Some(_) => {}
        }
        if !settings.is_object() {
            return Err(AppError::validation("Tenant settings must be a JSON object"));
        }

        let tenant = self.tenants.update_settings(&ctx.tenant, settings).await?;
        info!(tenant_id = %tenant.id, "Tenant settings updated");
        self.recorder.record(
            ctx,
            AuditEvent::new("tenant.settings_update", "tenant", Some(tenant.id.into_uuid())),
        );
        Ok(tenant)
    }
}
