//! In-memory implementation of every store trait.
//!
//! All tables live behind one [`RwLock`], so multi-row checks such as the
//! last-owner rule run under the same write guard as the mutation. Used by
//! the test suites and by `pulsestage serve --in-memory`.

mod directory;
mod questions;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use pulsestage_core::types::id::{QuestionId, TagId, TeamId, TenantId, UserId};
use pulsestage_entity::audit::AuditLogEntry;
use pulsestage_entity::question::Question;
use pulsestage_entity::tag::Tag;
use pulsestage_entity::team::{Team, TeamMembership};
use pulsestage_entity::tenant::Tenant;
use pulsestage_entity::user::User;

use crate::store::Stores;

/// Every table, keyed the way the relational schema constrains it.
#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    tenants: HashMap<TenantId, Tenant>,
    users: HashMap<UserId, User>,
    teams: HashMap<TeamId, Team>,
    memberships: HashMap<(UserId, TeamId), TeamMembership>,
    questions: HashMap<QuestionId, Question>,
    upvotes: BTreeSet<(UserId, QuestionId)>,
    tags: HashMap<TagId, Tag>,
    question_tags: BTreeSet<(QuestionId, TagId)>,
    audit: Vec<AuditLogEntry>,
}

impl MemoryState {
    fn tag_ids_for(&self, question: QuestionId) -> Vec<TagId> {
        self.question_tags
            .iter()
            .filter(|(q, _)| *q == question)
            .map(|(_, t)| *t)
            .collect()
    }
}

/// Shared in-memory database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire this store behind every store trait.
    pub fn stores(&self) -> Stores {
        Stores {
            tenants: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
            teams: Arc::new(self.clone()),
            memberships: Arc::new(self.clone()),
            questions: Arc::new(self.clone()),
            tags: Arc::new(self.clone()),
            audit: Arc::new(self.clone()),
        }
    }

    /// Insert a tenant. Tenant provisioning is outside the HTTP surface, so
    /// this is how tests and demo runs create one.
    pub async fn insert_tenant(&self, slug: &str, name: &str) -> Tenant {
        let now = Utc::now();
        let tenant = Tenant {
            id: TenantId::new(),
            slug: slug.to_lowercase(),
            name: name.to_string(),
            settings: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .tenants
            .insert(tenant.id, tenant.clone());
        tenant
    }

    /// Number of audit entries across all tenants.
    pub async fn audit_len(&self) -> usize {
        self.state.read().await.audit.len()
    }
}
