//! Tenant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pulsestage_core::types::id::TenantId;

/// A customer organization; the outermost isolation boundary.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: TenantId,
    /// URL-safe slug, unique across the deployment. Used as the subdomain.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Tenant-scoped settings (JSON object).
    pub settings: serde_json::Value,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
    /// When the tenant was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Whether new questions must pass moderator review before they are open.
    pub fn requires_review(&self) -> bool {
        self.settings
            .pointer("/moderation/requireReview")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}
