//! Tag handlers.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use pulsestage_entity::tag::CreateTag;

use crate::dto::request::{CreateTagBody, validated};
use crate::error::ApiError;
use crate::extractors::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// GET /api/tags
pub async fn list_tags(
    State(state): State<AppState>,
    ctx: MaybeAuthUser,
) -> Result<Json<Value>, ApiError> {
    let tags = state.tag_service.list(&ctx).await?;
    Ok(Json(json!({ "success": true, "data": tags })))
}

/// POST /api/tags
pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTagBody>,
) -> Result<Json<Value>, ApiError> {
    let req = validated(req)?;
    let tag = state
        .tag_service
        .create(
            &auth,
            CreateTag {
                name: req.name,
                color: req.color,
            },
        )
        .await?;
    Ok(Json(json!({ "success": true, "data": tag })))
}
