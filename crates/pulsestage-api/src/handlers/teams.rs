//! Team and team membership handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use pulsestage_core::types::id::{TeamId, UserId};
use pulsestage_service::team::{AddMemberRequest, CreateTeamRequest};

use crate::dto::request::{
    AddMemberBody, ChangeRoleRequest, CreateTeamBody, ListTeamsParams, UpdateSettingsRequest,
    validated,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
    ctx: MaybeAuthUser,
    Query(params): Query<ListTeamsParams>,
) -> Result<Json<Value>, ApiError> {
    let teams = state
        .team_service
        .list(&ctx, params.include_inactive)
        .await?;
    Ok(Json(json!({ "success": true, "data": teams })))
}

/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTeamBody>,
) -> Result<Json<Value>, ApiError> {
    let req = validated(req)?;
    let team = state
        .team_service
        .create(
            &auth,
            CreateTeamRequest {
                slug: req.slug,
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok(Json(json!({ "success": true, "data": team })))
}

/// GET /api/teams/mine
pub async fn my_memberships(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let memberships = state.member_service.mine(&auth).await?;
    Ok(Json(json!({ "success": true, "data": memberships })))
}

/// GET /api/teams/{id}
pub async fn get_team(
    State(state): State<AppState>,
    ctx: MaybeAuthUser,
    Path(id): Path<TeamId>,
) -> Result<Json<Value>, ApiError> {
    let team = state.team_service.get(&ctx, id).await?;
    Ok(Json(json!({ "success": true, "data": team })))
}

/// GET /api/teams/by-slug/{slug}
pub async fn get_team_by_slug(
    State(state): State<AppState>,
    ctx: MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let team = state.team_service.get_by_slug(&ctx, &slug).await?;
    Ok(Json(json!({ "success": true, "data": team })))
}

/// PUT /api/teams/{id}/settings
pub async fn update_team_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TeamId>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Value>, ApiError> {
    let team = state
        .team_service
        .update_settings(&auth, id, req.settings)
        .await?;
    Ok(Json(json!({ "success": true, "data": team })))
}

/// POST /api/teams/{id}/activate
pub async fn activate_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TeamId>,
) -> Result<Json<Value>, ApiError> {
    let team = state.team_service.set_active(&auth, id, true).await?;
    Ok(Json(json!({ "success": true, "data": team })))
}

/// POST /api/teams/{id}/deactivate
pub async fn deactivate_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TeamId>,
) -> Result<Json<Value>, ApiError> {
    let team = state.team_service.set_active(&auth, id, false).await?;
    Ok(Json(json!({ "success": true, "data": team })))
}

/// GET /api/teams/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TeamId>,
) -> Result<Json<Value>, ApiError> {
    let members = state.member_service.list(&auth, id).await?;
    Ok(Json(json!({ "success": true, "data": members })))
}

/// POST /api/teams/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TeamId>,
    Json(req): Json<AddMemberBody>,
) -> Result<Json<Value>, ApiError> {
    let req = validated(req)?;
    let role = req.role()?;
    let membership = state
        .member_service
        .add(
            &auth,
            id,
            AddMemberRequest {
                user_id: req.user_id,
                email: req.email,
                role,
            },
        )
        .await?;
    Ok(Json(json!({ "success": true, "data": membership })))
}

/// PUT /api/teams/{id}/members/{user_id}
pub async fn change_member_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(TeamId, UserId)>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<Value>, ApiError> {
    let role = req.role()?;
    let membership = state
        .member_service
        .change_role(&auth, id, user_id, role)
        .await?;
    Ok(Json(json!({ "success": true, "data": membership })))
}

/// DELETE /api/teams/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(TeamId, UserId)>,
) -> Result<Json<Value>, ApiError> {
    state.member_service.remove(&auth, id, user_id).await?;
    Ok(Json(json!({ "success": true, "data": { "removed": true } })))
}
