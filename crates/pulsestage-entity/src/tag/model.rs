//! Tag entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pulsestage_core::types::id::{TagId, TenantId};

/// A label attachable to questions. Names are unique per tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: TagId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Tag name.
    pub name: String,
    /// Optional display colour, e.g. `"#3B82F6"`.
    pub color: Option<String>,
    /// When the tag was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub color: Option<String>,
}
