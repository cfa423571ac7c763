//! Tenant handlers.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::dto::request::UpdateSettingsRequest;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/tenant
pub async fn current(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Value>, ApiError> {
    let tenant = state.tenant_service.current(&auth).await?;
    Ok(Json(json!({ "success": true, "data": tenant })))
}

/// PUT /api/tenant/settings
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Value>, ApiError> {
    let tenant = state
        .tenant_service
        .update_settings(&auth, req.settings)
        .await?;
    Ok(Json(json!({ "success": true, "data": tenant })))
}
