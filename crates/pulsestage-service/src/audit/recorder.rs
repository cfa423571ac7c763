//! Best-effort audit recording.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use pulsestage_database::store::AuditStore;
use pulsestage_entity::audit::CreateAuditLogEntry;

use crate::context::RequestContext;

/// One completed privileged mutation.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: String,
    pub entity_type: &'static str,
    pub entity_id: Option<Uuid>,
    pub metadata: Value,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, entity_type: &'static str, entity_id: Option<Uuid>) -> Self {
        Self {
            action: action.into(),
            entity_type,
            entity_id,
            metadata: Value::Object(Default::default()),
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Writes audit entries in the background.
///
/// A failed write is logged and dropped; it never fails the mutation that
/// produced it.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Queue an entry for the request's tenant.
    pub fn record(&self, ctx: &RequestContext, event: AuditEvent) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let scope = ctx.tenant;
        let entry = CreateAuditLogEntry {
            actor_id: ctx.user_id(),
            action: event.action,
            entity_type: event.entity_type.to_string(),
            entity_id: event.entity_id,
            metadata: event.metadata,
            ip_address: ctx.ip_address.clone(),
        };

        tokio::spawn(async move {
            match store.append(&scope, &entry).await {
                Ok(saved) => debug!(audit_id = %saved.id, action = %saved.action, "Audit entry recorded"),
                Err(e) => warn!(
                    tenant_id = %scope.tenant_id(),
                    action = %entry.action,
                    error = %e,
                    "Failed to record audit entry"
                ),
            }
        })
    }
}
