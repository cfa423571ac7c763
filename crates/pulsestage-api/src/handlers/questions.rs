//! Question handlers: public reads, submission, upvotes, and per-question
//! moderation.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use pulsestage_core::types::id::{QuestionId, TagId};
use pulsestage_service::question::{ListQuestionsQuery, SubmitQuestionRequest};

use crate::dto::request::{
    ListQuestionsParams, RespondRequest, SearchParams, SubmitQuestionBody, TagQuestionRequest,
    validated,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, MaybeAuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/questions
pub async fn list_questions(
    State(state): State<AppState>,
    ctx: MaybeAuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<ListQuestionsParams>,
) -> Result<Json<Value>, ApiError> {
    let query = ListQuestionsQuery {
        order: params.order()?,
        team_id: params.team_id,
        status: params.status,
        search: params.search.filter(|s| !s.trim().is_empty()),
        tag_id: params.tag_id,
    };
    let page = state
        .question_service
        .list(&ctx, query, pagination.into_page_request())
        .await?;
    Ok(Json(json!({ "success": true, "data": page })))
}

/// GET /api/questions/search
pub async fn search_questions(
    State(state): State<AppState>,
    ctx: MaybeAuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let page = state
        .question_service
        .search(&ctx, &params.q, params.team_id, pagination.into_page_request())
        .await?;
    Ok(Json(json!({ "success": true, "data": page })))
}

/// POST /api/questions
pub async fn submit_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SubmitQuestionBody>,
) -> Result<Json<Value>, ApiError> {
    let req = validated(req)?;
    let question = state
        .question_service
        .submit(
            &auth,
            SubmitQuestionRequest {
                body: req.body,
                team_id: req.team_id,
                anonymous: req.anonymous,
            },
        )
        .await?;
    Ok(Json(json!({ "success": true, "data": question })))
}

/// GET /api/questions/{id}
pub async fn get_question(
    State(state): State<AppState>,
    ctx: MaybeAuthUser,
    Path(id): Path<QuestionId>,
) -> Result<Json<Value>, ApiError> {
    let detail = state.question_service.get(&ctx, id).await?;
    Ok(Json(json!({ "success": true, "data": detail })))
}

/// POST /api/questions/{id}/upvote
pub async fn upvote_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<QuestionId>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.question_service.upvote(&auth, id).await?;
    Ok(Json(json!({ "success": true, "data": outcome })))
}

/// POST /api/questions/{id}/respond
pub async fn respond_to_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<QuestionId>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<Value>, ApiError> {
    let req = validated(req)?;
    let question = state
        .moderation_service
        .respond(&auth, id, &req.response)
        .await?;
    Ok(Json(json!({ "success": true, "data": question })))
}

/// POST /api/questions/{id}/approve
pub async fn approve_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<QuestionId>,
) -> Result<Json<Value>, ApiError> {
    let question = state.moderation_service.approve(&auth, id).await?;
    Ok(Json(json!({ "success": true, "data": question })))
}

/// POST /api/questions/{id}/pin
pub async fn pin_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<QuestionId>,
) -> Result<Json<Value>, ApiError> {
    let question = state.moderation_service.set_pinned(&auth, id, true).await?;
    Ok(Json(json!({ "success": true, "data": question })))
}

/// POST /api/questions/{id}/unpin
pub async fn unpin_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<QuestionId>,
) -> Result<Json<Value>, ApiError> {
    let question = state.moderation_service.set_pinned(&auth, id, false).await?;
    Ok(Json(json!({ "success": true, "data": question })))
}

/// POST /api/questions/{id}/freeze
pub async fn freeze_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<QuestionId>,
) -> Result<Json<Value>, ApiError> {
    let question = state.moderation_service.set_frozen(&auth, id, true).await?;
    Ok(Json(json!({ "success": true, "data": question })))
}

/// POST /api/questions/{id}/unfreeze
pub async fn unfreeze_question(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<QuestionId>,
) -> Result<Json<Value>, ApiError> {
    let question = state.moderation_service.set_frozen(&auth, id, false).await?;
    Ok(Json(json!({ "success": true, "data": question })))
}

/// POST /api/questions/{id}/tags
pub async fn add_question_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<QuestionId>,
    Json(req): Json<TagQuestionRequest>,
) -> Result<Json<Value>, ApiError> {
    let added = state.moderation_service.add_tag(&auth, id, req.tag_id).await?;
    Ok(Json(json!({ "success": true, "data": { "added": added } })))
}

/// DELETE /api/questions/{id}/tags/{tag_id}
pub async fn remove_question_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, tag_id)): Path<(QuestionId, TagId)>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.moderation_service.remove_tag(&auth, id, tag_id).await?;
    Ok(Json(json!({ "success": true, "data": { "removed": removed } })))
}
