//! Audit log listing.

use pulsestage_auth::rbac::{Action, AuthorizationGate, Target};
use pulsestage_core::result::AppResult;
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_database::store::{AuditFilter, AuditStore};
use pulsestage_entity::audit::AuditLogEntry;

use std::sync::Arc;

use crate::context::RequestContext;

/// Read access to the tenant's audit log.
#[derive(Debug, Clone)]
pub struct AuditService {
    audit: Arc<dyn AuditStore>,
    gate: AuthorizationGate,
}

impl AuditService {
    pub fn new(audit: Arc<dyn AuditStore>, gate: AuthorizationGate) -> Self {
        Self { audit, gate }
    }

    /// List entries, newest first. Requires the bootstrap credential or an
    /// admin role in at least one team.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: AuditFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.gate
            .require(ctx.principal(), Action::ViewAuditLog, &Target::all_teams(ctx.tenant_id()))
            .await?;
        self.audit.list(&ctx.tenant, &filter, &page).await
    }
}
