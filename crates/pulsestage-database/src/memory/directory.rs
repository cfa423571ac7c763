//! Tenants, users, teams, memberships, tags and audit entries.

use async_trait::async_trait;
use chrono::Utc;

use pulsestage_core::AppError;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{AuditLogId, TagId, TeamId, UserId};
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use pulsestage_entity::tag::{CreateTag, Tag};
use pulsestage_entity::team::{CreateTeam, Team, TeamMember, TeamMembership, TeamRole};
use pulsestage_entity::tenant::Tenant;
use pulsestage_entity::user::{CreateUser, User};

use super::MemoryStore;
use crate::store::{
    AuditFilter, AuditStore, MembershipStore, TagStore, TeamStore, TenantStore, UserStore,
    last_owner_error, owner_required_error,
};

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>> {
        let slug = slug.to_lowercase();
        let state = self.state.read().await;
        Ok(state.tenants.values().find(|t| t.slug == slug).cloned())
    }

    async fn get(&self, scope: &TenantScope) -> AppResult<Tenant> {
        let state = self.state.read().await;
        state
            .tenants
            .get(&scope.tenant_id())
            .cloned()
            .ok_or_else(|| AppError::not_found("Tenant not found"))
    }

    async fn update_settings(
        &self,
        scope: &TenantScope,
        settings: serde_json::Value,
    ) -> AppResult<Tenant> {
        let mut state = self.state.write().await;
        let tenant = state
            .tenants
            .get_mut(&scope.tenant_id())
            .ok_or_else(|| AppError::not_found("Tenant not found"))?;
        tenant.settings = settings;
        tenant.updated_at = Utc::now();
        Ok(tenant.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, scope: &TenantScope, id: UserId) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&id)
            .filter(|u| scope.contains(u.tenant_id))
            .cloned())
    }

    async fn find_by_email(&self, scope: &TenantScope, email: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| scope.contains(u.tenant_id) && u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, scope: &TenantScope, data: &CreateUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        let taken = state
            .users
            .values()
            .any(|u| scope.contains(u.tenant_id) && u.email.eq_ignore_ascii_case(&data.email));
        if taken {
            return Err(AppError::conflict(format!(
                "Email '{}' already exists",
                data.email
            )));
        }
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            tenant_id: scope.tenant_id(),
            email: data.email.clone(),
            name: data.name.clone(),
            sso_id: data.sso_id.clone(),
            is_active: true,
            primary_team_id: data.primary_team_id,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn list(&self, scope: &TenantScope, include_inactive: bool) -> AppResult<Vec<Team>> {
        let state = self.state.read().await;
        let mut teams: Vec<Team> = state
            .teams
            .values()
            .filter(|t| scope.contains(t.tenant_id) && (include_inactive || t.is_active))
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn find_by_id(&self, scope: &TenantScope, id: TeamId) -> AppResult<Option<Team>> {
        let state = self.state.read().await;
        Ok(state
            .teams
            .get(&id)
            .filter(|t| scope.contains(t.tenant_id))
            .cloned())
    }

    async fn find_by_slug(&self, scope: &TenantScope, slug: &str) -> AppResult<Option<Team>> {
        let state = self.state.read().await;
        Ok(state
            .teams
            .values()
            .find(|t| scope.contains(t.tenant_id) && t.slug == slug)
            .cloned())
    }

    async fn create(
        &self,
        scope: &TenantScope,
        data: &CreateTeam,
        owner: Option<UserId>,
    ) -> AppResult<Team> {
        let mut state = self.state.write().await;
        if state
            .teams
            .values()
            .any(|t| scope.contains(t.tenant_id) && t.slug == data.slug)
        {
            return Err(AppError::conflict(format!(
                "Team slug '{}' already exists",
                data.slug
            )));
        }
        let now = Utc::now();
        let team = Team {
            id: TeamId::new(),
            tenant_id: scope.tenant_id(),
            slug: data.slug.clone(),
            name: data.name.clone(),
            description: data.description.clone(),
            is_active: true,
            settings: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        };
        state.teams.insert(team.id, team.clone());
        if let Some(owner) = owner {
            state.memberships.insert(
                (owner, team.id),
                TeamMembership {
                    tenant_id: scope.tenant_id(),
                    user_id: owner,
                    team_id: team.id,
                    role: TeamRole::Owner,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        Ok(team)
    }

    async fn set_active(&self, scope: &TenantScope, id: TeamId, active: bool) -> AppResult<Team> {
        let mut state = self.state.write().await;
        let team = state
            .teams
            .get_mut(&id)
            .filter(|t| scope.contains(t.tenant_id))
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        team.is_active = active;
        team.updated_at = Utc::now();
        Ok(team.clone())
    }

    async fn update_settings(
        &self,
        scope: &TenantScope,
        id: TeamId,
        settings: serde_json::Value,
    ) -> AppResult<Team> {
        let mut state = self.state.write().await;
        let team = state
            .teams
            .get_mut(&id)
            .filter(|t| scope.contains(t.tenant_id))
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        team.settings = settings;
        team.updated_at = Utc::now();
        Ok(team.clone())
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn find_role(
        &self,
        scope: &TenantScope,
        user: UserId,
        team: TeamId,
    ) -> AppResult<Option<TeamRole>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .get(&(user, team))
            .filter(|m| scope.contains(m.tenant_id))
            .map(|m| m.role))
    }

    async fn list_for_user(
        &self,
        scope: &TenantScope,
        user: UserId,
    ) -> AppResult<Vec<TeamMembership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .filter(|m| scope.contains(m.tenant_id) && m.user_id == user)
            .cloned()
            .collect())
    }

    async fn list_members(&self, scope: &TenantScope, team: TeamId) -> AppResult<Vec<TeamMember>> {
        let state = self.state.read().await;
        let mut members: Vec<TeamMember> = state
            .memberships
            .values()
            .filter(|m| scope.contains(m.tenant_id) && m.team_id == team)
            .filter_map(|m| {
                state.users.get(&m.user_id).map(|u| TeamMember {
                    user_id: u.id,
                    email: u.email.clone(),
                    name: u.name.clone(),
                    role: m.role,
                    joined_at: m.created_at,
                })
            })
            .collect();
        members.sort_by(|a, b| b.role.cmp(&a.role).then_with(|| a.name.cmp(&b.name)));
        Ok(members)
    }

    async fn count_owners(&self, scope: &TenantScope, team: TeamId) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .values()
            .filter(|m| {
                scope.contains(m.tenant_id) && m.team_id == team && m.role == TeamRole::Owner
            })
            .count() as u64)
    }

    async fn add(
        &self,
        scope: &TenantScope,
        team: TeamId,
        user: UserId,
        role: TeamRole,
    ) -> AppResult<TeamMembership> {
        let mut state = self.state.write().await;
        let team_ok = state
            .teams
            .get(&team)
            .is_some_and(|t| scope.contains(t.tenant_id));
        let user_ok = state
            .users
            .get(&user)
            .is_some_and(|u| scope.contains(u.tenant_id));
        if !team_ok || !user_ok {
            return Err(AppError::not_found("Team or user not found"));
        }
        if state.memberships.contains_key(&(user, team)) {
            return Err(AppError::conflict("User is already a member of this team"));
        }
        let has_owner = state
            .memberships
            .values()
            .any(|m| m.team_id == team && m.role == TeamRole::Owner);
        if !has_owner && role != TeamRole::Owner {
            return Err(owner_required_error());
        }
        let now = Utc::now();
        let membership = TeamMembership {
            tenant_id: scope.tenant_id(),
            user_id: user,
            team_id: team,
            role,
            created_at: now,
            updated_at: now,
        };
        state.memberships.insert((user, team), membership.clone());
        Ok(membership)
    }

    async fn change_role(
        &self,
        scope: &TenantScope,
        team: TeamId,
        user: UserId,
        role: TeamRole,
    ) -> AppResult<TeamMembership> {
        let mut state = self.state.write().await;
        let owners = state
            .memberships
            .values()
            .filter(|m| {
                scope.contains(m.tenant_id) && m.team_id == team && m.role == TeamRole::Owner
            })
            .count();
        let membership = state
            .memberships
            .get_mut(&(user, team))
            .filter(|m| scope.contains(m.tenant_id))
            .ok_or_else(|| AppError::not_found("Team membership not found"))?;
        if membership.role == TeamRole::Owner && role != TeamRole::Owner && owners <= 1 {
            return Err(last_owner_error());
        }
        membership.role = role;
        membership.updated_at = Utc::now();
        Ok(membership.clone())
    }

    async fn remove(&self, scope: &TenantScope, team: TeamId, user: UserId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let owners = state
            .memberships
            .values()
            .filter(|m| {
                scope.contains(m.tenant_id) && m.team_id == team && m.role == TeamRole::Owner
            })
            .count();
        let role = state
            .memberships
            .get(&(user, team))
            .filter(|m| scope.contains(m.tenant_id))
            .map(|m| m.role)
            .ok_or_else(|| AppError::not_found("Team membership not found"))?;
        if role == TeamRole::Owner && owners <= 1 {
            return Err(last_owner_error());
        }
        state.memberships.remove(&(user, team));
        Ok(())
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn list(&self, scope: &TenantScope) -> AppResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|t| scope.contains(t.tenant_id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_id(&self, scope: &TenantScope, id: TagId) -> AppResult<Option<Tag>> {
        let state = self.state.read().await;
        Ok(state
            .tags
            .get(&id)
            .filter(|t| scope.contains(t.tenant_id))
            .cloned())
    }

    async fn create(&self, scope: &TenantScope, data: &CreateTag) -> AppResult<Tag> {
        let mut state = self.state.write().await;
        if state
            .tags
            .values()
            .any(|t| scope.contains(t.tenant_id) && t.name == data.name)
        {
            return Err(AppError::conflict(format!(
                "Tag '{}' already exists",
                data.name
            )));
        }
        let tag = Tag {
            id: TagId::new(),
            tenant_id: scope.tenant_id(),
            name: data.name.clone(),
            color: data.color.clone(),
            created_at: Utc::now(),
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(
        &self,
        scope: &TenantScope,
        data: &CreateAuditLogEntry,
    ) -> AppResult<AuditLogEntry> {
        let entry = AuditLogEntry {
            id: AuditLogId::new(),
            tenant_id: scope.tenant_id(),
            actor_id: data.actor_id,
            action: data.action.clone(),
            entity_type: data.entity_type.clone(),
            entity_id: data.entity_id,
            metadata: data.metadata.clone(),
            ip_address: data.ip_address.clone(),
            created_at: Utc::now(),
        };
        self.state.write().await.audit.push(entry.clone());
        Ok(entry)
    }

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let state = self.state.read().await;
        let matching: Vec<&AuditLogEntry> = state
            .audit
            .iter()
            .rev()
            .filter(|e| scope.contains(e.tenant_id))
            .filter(|e| filter.action.as_ref().is_none_or(|a| &e.action == a))
            .filter(|e| filter.actor_id.is_none_or(|a| e.actor_id == Some(a)))
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (MemoryStore, TenantScope, TeamId, UserId) {
        let store = MemoryStore::new();
        let tenant = store.insert_tenant("acme", "Acme").await;
        let scope = TenantScope::new(tenant.id);
        let owner = UserStore::create(
            &store,
            &scope,
            &CreateUser {
                email: "owner@acme.test".into(),
                name: "Owner".into(),
                sso_id: None,
                primary_team_id: None,
            },
        )
        .await
        .unwrap();
        let team = TeamStore::create(
            &store,
            &scope,
            &CreateTeam {
                slug: "eng".into(),
                name: "Engineering".into(),
                description: None,
            },
            Some(owner.id),
        )
        .await
        .unwrap();
        (store, scope, team.id, owner.id)
    }

    #[tokio::test]
    async fn test_last_owner_cannot_be_removed_or_demoted() {
        let (store, scope, team, owner) = setup().await;

        let err = store.remove(&scope, team, owner).await.unwrap_err();
        assert_eq!(err.code, Some(pulsestage_core::error::codes::LAST_OWNER_PROTECTED));

        let err = store
            .change_role(&scope, team, owner, TeamRole::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.code, Some(pulsestage_core::error::codes::LAST_OWNER_PROTECTED));
        assert_eq!(
            store.find_role(&scope, owner, team).await.unwrap(),
            Some(TeamRole::Owner)
        );
    }

    #[tokio::test]
    async fn test_membership_lookup_is_tenant_scoped() {
        let (store, _scope, team, owner) = setup().await;
        let other = store.insert_tenant("globex", "Globex").await;
        let other_scope = TenantScope::new(other.id);
        assert_eq!(store.find_role(&other_scope, owner, team).await.unwrap(), None);
        assert!(
            TeamStore::find_by_id(&store, &other_scope, team)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_membership_conflicts() {
        let (store, scope, team, owner) = setup().await;
        let err = store
            .add(&scope, team, owner, TeamRole::Member)
            .await
            .unwrap_err();
        assert_eq!(err.kind, pulsestage_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_ownerless_team_accepts_only_an_owner_first() {
        let (store, scope, _team, _owner) = setup().await;
        let team = TeamStore::create(
            &store,
            &scope,
            &CreateTeam {
                slug: "people-ops".into(),
                name: "People Ops".into(),
                description: None,
            },
            None,
        )
        .await
        .unwrap();
        let mut users = Vec::new();
        for email in ["dev@acme.test", "lead@acme.test"] {
            let user = UserStore::create(
                &store,
                &scope,
                &CreateUser {
                    email: email.into(),
                    name: email.into(),
                    sso_id: None,
                    primary_team_id: None,
                },
            )
            .await
            .unwrap();
            users.push(user.id);
        }

        let err = store
            .add(&scope, team.id, users[0], TeamRole::Member)
            .await
            .unwrap_err();
        assert_eq!(err.kind, pulsestage_core::error::ErrorKind::Validation);
        assert_eq!(err.code, Some(pulsestage_core::error::codes::LAST_OWNER_PROTECTED));
        assert!(store.list_members(&scope, team.id).await.unwrap().is_empty());

        store
            .add(&scope, team.id, users[1], TeamRole::Owner)
            .await
            .unwrap();
        store
            .add(&scope, team.id, users[0], TeamRole::Member)
            .await
            .unwrap();
        assert_eq!(store.count_owners(&scope, team.id).await.unwrap(), 1);
    }
}
