//! Tenant repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use pulsestage_core::error::{AppError, ErrorKind};
use pulsestage_core::result::AppResult;
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::tenant::Tenant;

use crate::store::TenantStore;

/// Repository for tenants.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Create a new tenant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for TenantRepository {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE slug = LOWER($1)")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find tenant by slug", e)
            })
    }

    async fn get(&self, scope: &TenantScope) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(scope.tenant_id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load tenant", e))?
            .ok_or_else(|| AppError::not_found("Tenant not found"))
    }

    async fn update_settings(
        &self,
        scope: &TenantScope,
        settings: serde_json::Value,
    ) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET settings = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(scope.tenant_id())
        .bind(&settings)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update tenant settings", e)
        })?
        .ok_or_else(|| AppError::not_found("Tenant not found"))
    }
}
