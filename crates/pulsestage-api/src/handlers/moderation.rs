//! Moderation dashboard handlers.

use axum::Json;
use axum::extract::{Query, State};
use serde_json::{Value, json};

use pulsestage_service::moderation::ModerationQueueQuery;

use crate::dto::request::{BulkActionRequest, BulkTagRequest, QueueParams, StatsParams, validated};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/moderation/queue
pub async fn queue(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<QueueParams>,
) -> Result<Json<Value>, ApiError> {
    let query = ModerationQueueQuery {
        team_id: params.team_id,
        under_review_only: params.under_review_only,
    };
    let page = state
        .moderation_service
        .queue(&auth, query, pagination.into_page_request())
        .await?;
    Ok(Json(json!({ "success": true, "data": page })))
}

/// GET /api/moderation/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<StatsParams>,
) -> Result<Json<Value>, ApiError> {
    let counts = state.moderation_service.stats(&auth, params.team_id).await?;
    Ok(Json(json!({ "success": true, "data": counts })))
}

/// POST /api/moderation/bulk-tag
pub async fn bulk_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkTagRequest>,
) -> Result<Json<Value>, ApiError> {
    let req = validated(req)?;
    let result = state
        .moderation_service
        .bulk_tag(&auth, &req.question_ids, req.tag_id)
        .await?;
    Ok(Json(json!({ "success": true, "data": result })))
}

/// POST /api/moderation/bulk-action
pub async fn bulk_action(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkActionRequest>,
) -> Result<Json<Value>, ApiError> {
    let req = validated(req)?;
    let result = state
        .moderation_service
        .bulk_action(&auth, &req.question_ids, req.action)
        .await?;
    Ok(Json(json!({ "success": true, "data": result })))
}
