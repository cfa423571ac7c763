//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use pulsestage_core::error::{AppError, ErrorKind};
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::AuditLogId;
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use crate::store::{AuditFilter, AuditStore};

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, scope: &TenantScope, filter: &AuditFilter) {
    qb.push(" WHERE tenant_id = ").push_bind(scope.tenant_id());
    if let Some(action) = &filter.action {
        qb.push(" AND action = ").push_bind(action.clone());
    }
    if let Some(actor) = filter.actor_id {
        qb.push(" AND actor_id = ").push_bind(actor);
    }
}

#[async_trait]
impl AuditStore for AuditLogRepository {
    async fn append(
        &self,
        scope: &TenantScope,
        data: &CreateAuditLogEntry,
    ) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_logs (id, tenant_id, actor_id, action, entity_type, entity_id, metadata, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(AuditLogId::new())
        .bind(scope.tenant_id())
        .bind(data.actor_id)
        .bind(&data.action)
        .bind(&data.entity_type)
        .bind(data.entity_id)
        .bind(&data.metadata)
        .bind(&data.ip_address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))
    }

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_logs");
        push_conditions(&mut count, scope, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM audit_logs");
        push_conditions(&mut select, scope, filter);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let entries = select
            .build_query_as::<AuditLogEntry>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list audit log", e)
            })?;

        Ok(PageResponse::new(entries, page, total as u64))
    }
}
