//! Tag repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use pulsestage_core::error::{AppError, ErrorKind};
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::TagId;
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::tag::{CreateTag, Tag};

use crate::store::TagStore;

/// Repository for tags.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagStore for TagRepository {
    async fn list(&self, scope: &TenantScope) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE tenant_id = $1 ORDER BY name ASC")
            .bind(scope.tenant_id())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tags", e))
    }

    async fn find_by_id(&self, scope: &TenantScope, id: TagId) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tag", e))
    }

    async fn create(&self, scope: &TenantScope, data: &CreateTag) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (id, tenant_id, name, color) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(TagId::new())
        .bind(scope.tenant_id())
        .bind(&data.name)
        .bind(&data.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("tags_tenant_name_key") =>
            {
                AppError::conflict(format!("Tag '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create tag", e),
        })
    }
}
