//! Audit log handlers.

use axum::Json;
use axum::extract::{Query, State};
use serde_json::{Value, json};

use pulsestage_database::store::AuditFilter;

use crate::dto::request::AuditQueryParams;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/audit
pub async fn list_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filters): Query<AuditQueryParams>,
) -> Result<Json<Value>, ApiError> {
    let filter = AuditFilter {
        action: filters.action.filter(|a| !a.is_empty()),
        actor_id: filters.actor_id,
    };
    let result = state
        .audit_service
        .list(&auth, filter, params.into_page_request())
        .await?;

    Ok(Json(json!({ "success": true, "data": result })))
}
