//! Persistence traits implemented by the PostgreSQL repositories and the
//! in-memory store.
//!
//! Every method takes a [`TenantScope`] or a [`QueryPredicate`] (which always
//! embeds one). The only exception is [`TenantStore::find_by_slug`], the
//! lookup that produces a tenant scope in the first place.

pub mod question;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use pulsestage_core::AppError;
use pulsestage_core::error::codes::LAST_OWNER_PROTECTED;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{TagId, TeamId, UserId};
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use pulsestage_entity::tag::{CreateTag, Tag};
use pulsestage_entity::team::{CreateTeam, Team, TeamMember, TeamMembership, TeamRole};
use pulsestage_entity::tenant::Tenant;
use pulsestage_entity::user::{CreateUser, User};

pub use question::{
    QuestionFilter, QuestionMutation, QuestionOrder, QuestionStore, StatusCounts, UpvoteWrite,
};

/// Tenant lookup and settings.
#[async_trait]
pub trait TenantStore: Send + Sync + Debug + 'static {
    /// Resolve a tenant by its slug. Used by tenant resolution only.
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>>;

    /// Load the tenant bound to `scope`.
    async fn get(&self, scope: &TenantScope) -> AppResult<Tenant>;

    /// Replace the tenant's settings object.
    async fn update_settings(
        &self,
        scope: &TenantScope,
        settings: serde_json::Value,
    ) -> AppResult<Tenant>;
}

/// Users within a tenant.
#[async_trait]
pub trait UserStore: Send + Sync + Debug + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, scope: &TenantScope, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, scope: &TenantScope, email: &str) -> AppResult<Option<User>>;

    /// Create a user. Fails with a conflict if the email is taken.
    async fn create(&self, scope: &TenantScope, data: &CreateUser) -> AppResult<User>;
}

/// Teams within a tenant.
#[async_trait]
pub trait TeamStore: Send + Sync + Debug + 'static {
    /// List teams, optionally including deactivated ones.
    async fn list(&self, scope: &TenantScope, include_inactive: bool) -> AppResult<Vec<Team>>;

    /// Find a team by ID.
    async fn find_by_id(&self, scope: &TenantScope, id: TeamId) -> AppResult<Option<Team>>;

    /// Find a team by slug.
    async fn find_by_slug(&self, scope: &TenantScope, slug: &str) -> AppResult<Option<Team>>;

    /// Create a team, optionally making `owner` its first owner in the same write.
    async fn create(
        &self,
        scope: &TenantScope,
        data: &CreateTeam,
        owner: Option<UserId>,
    ) -> AppResult<Team>;

    /// Activate or deactivate a team.
    async fn set_active(&self, scope: &TenantScope, id: TeamId, active: bool) -> AppResult<Team>;

    /// Replace a team's settings object.
    async fn update_settings(
        &self,
        scope: &TenantScope,
        id: TeamId,
        settings: serde_json::Value,
    ) -> AppResult<Team>;
}

/// Team memberships. Writes that can drop a team's owner count re-check it
/// atomically with the write.
#[async_trait]
pub trait MembershipStore: Send + Sync + Debug + 'static {
    /// The user's role in the team, or `None` if there is no membership row.
    async fn find_role(
        &self,
        scope: &TenantScope,
        user: UserId,
        team: TeamId,
    ) -> AppResult<Option<TeamRole>>;

    /// Every membership the user holds in this tenant.
    async fn list_for_user(
        &self,
        scope: &TenantScope,
        user: UserId,
    ) -> AppResult<Vec<TeamMembership>>;

    /// Members of a team joined with their profiles.
    async fn list_members(&self, scope: &TenantScope, team: TeamId) -> AppResult<Vec<TeamMember>>;

    /// Number of owner memberships in a team.
    async fn count_owners(&self, scope: &TenantScope, team: TeamId) -> AppResult<u64>;

    /// Add a membership. Fails with a conflict if the pair already exists.
    /// A team with no owner accepts only an owner, otherwise the add fails
    /// with `LAST_OWNER_PROTECTED`.
    async fn add(
        &self,
        scope: &TenantScope,
        team: TeamId,
        user: UserId,
        role: TeamRole,
    ) -> AppResult<TeamMembership>;

    /// Change a member's role. Demoting the last owner fails with
    /// `LAST_OWNER_PROTECTED`.
    async fn change_role(
        &self,
        scope: &TenantScope,
        team: TeamId,
        user: UserId,
        role: TeamRole,
    ) -> AppResult<TeamMembership>;

    /// Remove a membership. Removing the last owner fails with
    /// `LAST_OWNER_PROTECTED`.
    async fn remove(&self, scope: &TenantScope, team: TeamId, user: UserId) -> AppResult<()>;
}

/// Tags within a tenant.
#[async_trait]
pub trait TagStore: Send + Sync + Debug + 'static {
    /// List all tags, alphabetically.
    async fn list(&self, scope: &TenantScope) -> AppResult<Vec<Tag>>;

    /// Find a tag by ID.
    async fn find_by_id(&self, scope: &TenantScope, id: TagId) -> AppResult<Option<Tag>>;

    /// Create a tag. Fails with a conflict if the name is taken.
    async fn create(&self, scope: &TenantScope, data: &CreateTag) -> AppResult<Tag>;
}

/// Filters for audit log listings.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Only entries with this action.
    pub action: Option<String>,
    /// Only entries by this actor.
    pub actor_id: Option<UserId>,
}

/// The append-only audit log.
#[async_trait]
pub trait AuditStore: Send + Sync + Debug + 'static {
    /// Append an entry.
    async fn append(
        &self,
        scope: &TenantScope,
        data: &CreateAuditLogEntry,
    ) -> AppResult<AuditLogEntry>;

    /// List entries, newest first.
    async fn list(
        &self,
        scope: &TenantScope,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>>;
}

/// Error for a membership write that would leave a team without an owner.
pub(crate) fn last_owner_error() -> AppError {
    AppError::validation("Cannot remove or demote the last owner of a team")
        .with_code(LAST_OWNER_PROTECTED)
}

/// Error for adding a non-owner to a team that has no owner yet.
pub(crate) fn owner_required_error() -> AppError {
    AppError::validation("A team without an owner must gain an owner first")
        .with_code(LAST_OWNER_PROTECTED)
}

/// All stores behind one handle, wired once at startup.
#[derive(Debug, Clone)]
pub struct Stores {
    pub tenants: Arc<dyn TenantStore>,
    pub users: Arc<dyn UserStore>,
    pub teams: Arc<dyn TeamStore>,
    pub memberships: Arc<dyn MembershipStore>,
    pub questions: Arc<dyn QuestionStore>,
    pub tags: Arc<dyn TagStore>,
    pub audit: Arc<dyn AuditStore>,
}
