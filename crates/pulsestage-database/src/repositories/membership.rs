//! Team membership repository implementation.
//!
//! Adds, role changes, and removals lock the team's membership rows with
//! `SELECT ... FOR UPDATE` and re-count owners inside the same transaction,
//! so a concurrent promote/demote pair cannot leave a team ownerless. Adds
//! also lock the team row itself, since an ownerless team may have no
//! membership rows to lock.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use pulsestage_core::error::{AppError, ErrorKind};
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{TeamId, UserId};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::team::{TeamMember, TeamMembership, TeamRole};

use crate::store::{MembershipStore, last_owner_error, owner_required_error};

/// Repository for team memberships.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Create a new membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the team's memberships and return the target's current role and
    /// the team's owner count.
    async fn lock_team(
        tx: &mut Transaction<'_, Postgres>,
        scope: &TenantScope,
        team: TeamId,
        user: UserId,
    ) -> AppResult<(Option<TeamRole>, i64)> {
        let rows: Vec<(UserId, TeamRole)> = sqlx::query_as(
            "SELECT user_id, role FROM team_memberships \
             WHERE tenant_id = $1 AND team_id = $2 FOR UPDATE",
        )
        .bind(scope.tenant_id())
        .bind(team)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to lock team memberships", e)
        })?;

        let current = rows.iter().find(|(id, _)| *id == user).map(|(_, r)| *r);
        let owners = rows.iter().filter(|(_, r)| *r == TeamRole::Owner).count() as i64;
        Ok((current, owners))
    }
}

#[async_trait]
impl MembershipStore for MembershipRepository {
    async fn find_role(
        &self,
        scope: &TenantScope,
        user: UserId,
        team: TeamId,
    ) -> AppResult<Option<TeamRole>> {
        sqlx::query_scalar::<_, TeamRole>(
            "SELECT role FROM team_memberships \
             WHERE tenant_id = $1 AND user_id = $2 AND team_id = $3",
        )
        .bind(scope.tenant_id())
        .bind(user)
        .bind(team)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve team role", e))
    }

    async fn list_for_user(
        &self,
        scope: &TenantScope,
        user: UserId,
    ) -> AppResult<Vec<TeamMembership>> {
        sqlx::query_as::<_, TeamMembership>(
            "SELECT * FROM team_memberships WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(scope.tenant_id())
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list user memberships", e)
        })
    }

    async fn list_members(&self, scope: &TenantScope, team: TeamId) -> AppResult<Vec<TeamMember>> {
        sqlx::query_as::<_, TeamMember>(
            "SELECT u.id AS user_id, u.email, u.name, m.role, m.created_at AS joined_at \
             FROM team_memberships m \
             JOIN users u ON u.id = m.user_id AND u.tenant_id = m.tenant_id \
             WHERE m.tenant_id = $1 AND m.team_id = $2 \
             ORDER BY m.role DESC, u.name ASC",
        )
        .bind(scope.tenant_id())
        .bind(team)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list team members", e))
    }

    async fn count_owners(&self, scope: &TenantScope, team: TeamId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_memberships \
             WHERE tenant_id = $1 AND team_id = $2 AND role = 'owner'",
        )
        .bind(scope.tenant_id())
        .bind(team)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count owners", e))?;
        Ok(count as u64)
    }

    async fn add(
        &self,
        scope: &TenantScope,
        team: TeamId,
        user: UserId,
        role: TeamRole,
    ) -> AppResult<TeamMembership> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("SELECT id FROM teams WHERE tenant_id = $1 AND id = $2 FOR UPDATE")
            .bind(scope.tenant_id())
            .bind(team)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock team", e))?
            .ok_or_else(|| AppError::not_found("Team or user not found"))?;

        let (current, owners) = Self::lock_team(&mut tx, scope, team, user).await?;
        if current.is_some() {
            return Err(AppError::conflict("User is already a member of this team"));
        }
        if owners == 0 && role != TeamRole::Owner {
            return Err(owner_required_error());
        }

        let membership = sqlx::query_as::<_, TeamMembership>(
            "INSERT INTO team_memberships (tenant_id, user_id, team_id, role) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(scope.tenant_id())
        .bind(user)
        .bind(team)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("team_memberships_user_team_key") =>
            {
                AppError::conflict("User is already a member of this team")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to add team member", e),
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit team member", e)
        })?;
        Ok(membership)
    }

    async fn change_role(
        &self,
        scope: &TenantScope,
        team: TeamId,
        user: UserId,
        role: TeamRole,
    ) -> AppResult<TeamMembership> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let (current, owners) = Self::lock_team(&mut tx, scope, team, user).await?;
        let current = current.ok_or_else(|| AppError::not_found("Team membership not found"))?;
        if current == TeamRole::Owner && role != TeamRole::Owner && owners <= 1 {
            return Err(last_owner_error());
        }

        let membership = sqlx::query_as::<_, TeamMembership>(
            "UPDATE team_memberships SET role = $4, updated_at = NOW() \
             WHERE tenant_id = $1 AND team_id = $2 AND user_id = $3 RETURNING *",
        )
        .bind(scope.tenant_id())
        .bind(team)
        .bind(user)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to change role", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit role change", e)
        })?;
        Ok(membership)
    }

    async fn remove(&self, scope: &TenantScope, team: TeamId, user: UserId) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let (current, owners) = Self::lock_team(&mut tx, scope, team, user).await?;
        let current = current.ok_or_else(|| AppError::not_found("Team membership not found"))?;
        if current == TeamRole::Owner && owners <= 1 {
            return Err(last_owner_error());
        }

        sqlx::query(
            "DELETE FROM team_memberships WHERE tenant_id = $1 AND team_id = $2 AND user_id = $3",
        )
        .bind(scope.tenant_id())
        .bind(team)
        .bind(user)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove member", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit member removal", e)
        })?;
        Ok(())
    }
}
