//! Team repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use pulsestage_core::error::{AppError, ErrorKind};
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{TeamId, UserId};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::team::{CreateTeam, Team, TeamRole};

use crate::store::TeamStore;

/// Repository for teams.
#[derive(Debug, Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Create a new team repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamStore for TeamRepository {
    async fn list(&self, scope: &TenantScope, include_inactive: bool) -> AppResult<Vec<Team>> {
        sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE tenant_id = $1 AND (is_active OR $2) ORDER BY name ASC",
        )
        .bind(scope.tenant_id())
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list teams", e))
    }

    async fn find_by_id(&self, scope: &TenantScope, id: TeamId) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find team", e))
    }

    async fn find_by_slug(&self, scope: &TenantScope, slug: &str) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE tenant_id = $1 AND slug = $2")
            .bind(scope.tenant_id())
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find team by slug", e)
            })
    }

    async fn create(
        &self,
        scope: &TenantScope,
        data: &CreateTeam,
        owner: Option<UserId>,
    ) -> AppResult<Team> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let team = sqlx::query_as::<_, Team>(
            "INSERT INTO teams (id, tenant_id, slug, name, description) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(TeamId::new())
        .bind(scope.tenant_id())
        .bind(&data.slug)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("teams_tenant_slug_key") =>
            {
                AppError::conflict(format!("Team slug '{}' already exists", data.slug))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create team", e),
        })?;

        if let Some(owner) = owner {
            sqlx::query(
                "INSERT INTO team_memberships (tenant_id, user_id, team_id, role) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(scope.tenant_id())
            .bind(owner)
            .bind(team.id)
            .bind(TeamRole::Owner)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to add team owner", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit team creation", e)
        })?;

        Ok(team)
    }

    async fn set_active(&self, scope: &TenantScope, id: TeamId, active: bool) -> AppResult<Team> {
        sqlx::query_as::<_, Team>(
            "UPDATE teams SET is_active = $3, updated_at = NOW() \
             WHERE tenant_id = $1 AND id = $2 RETURNING *",
        )
        .bind(scope.tenant_id())
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update team", e))?
        .ok_or_else(|| AppError::not_found("Team not found"))
    }

    async fn update_settings(
        &self,
        scope: &TenantScope,
        id: TeamId,
        settings: serde_json::Value,
    ) -> AppResult<Team> {
        sqlx::query_as::<_, Team>(
            "UPDATE teams SET settings = $3, updated_at = NOW() \
             WHERE tenant_id = $1 AND id = $2 RETURNING *",
        )
        .bind(scope.tenant_id())
        .bind(id)
        .bind(&settings)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update team settings", e)
        })?
        .ok_or_else(|| AppError::not_found("Team not found"))
    }
}
