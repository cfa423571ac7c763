//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use pulsestage_core::types::id::{AuditLogId, TenantId, UserId};

/// An append-only record of a privileged mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: AuditLogId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// The acting user; `None` when the bootstrap credential acted.
    pub actor_id: Option<UserId>,
    /// The action that was performed (e.g., `"question.respond"`).
    pub action: String,
    /// The type of entity acted on (e.g., `"question"`, `"team"`).
    pub entity_type: String,
    /// The entity ID, if the action targeted a single entity.
    pub entity_id: Option<Uuid>,
    /// Additional details about the action.
    pub metadata: serde_json::Value,
    /// IP address of the actor.
    pub ip_address: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append an audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    pub actor_id: Option<UserId>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub ip_address: Option<String>,
}
