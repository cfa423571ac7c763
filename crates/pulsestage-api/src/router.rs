//! Route definitions for the PulseStage HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! Everything except the health probe runs behind tenant resolution.

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;

    let tenant_routes = Router::new()
        .merge(auth_routes())
        .merge(tenant_routes())
        .merge(question_routes())
        .merge(moderation_routes())
        .merge(team_routes())
        .merge(tag_routes())
        .merge(admin_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::tenant::resolve_tenant,
        ));

    let api_routes = Router::new().merge(health_routes()).merge(tenant_routes);

    let cors = middleware::cors::build_cors_layer(&server.cors, &state.config.auth);

    Router::new()
        .nest("/api", api_routes)
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness probe, outside tenant resolution.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Session endpoints: login, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/tenant", get(handlers::tenant::current))
        .route("/tenant/settings", put(handlers::tenant::update_settings))
}

/// Public question reads and writes, plus per-question moderation
fn question_routes() -> Router<AppState> {
    use handlers::questions as q;

    Router::new()
        .route("/questions", get(q::list_questions).post(q::submit_question))
        .route("/questions/search", get(q::search_questions))
        .route("/questions/{id}", get(q::get_question))
        .route("/questions/{id}/upvote", post(q::upvote_question))
        .route("/questions/{id}/respond", post(q::respond_to_question))
        .route("/questions/{id}/approve", post(q::approve_question))
        .route("/questions/{id}/pin", post(q::pin_question))
        .route("/questions/{id}/unpin", post(q::unpin_question))
        .route("/questions/{id}/freeze", post(q::freeze_question))
        .route("/questions/{id}/unfreeze", post(q::unfreeze_question))
        .route("/questions/{id}/tags", post(q::add_question_tag))
        .route("/questions/{id}/tags/{tag_id}", delete(q::remove_question_tag))
}

/// Moderation dashboard and bulk operations
fn moderation_routes() -> Router<AppState> {
    Router::new()
        .route("/moderation/queue", get(handlers::moderation::queue))
        .route("/moderation/stats", get(handlers::moderation::stats))
        .route("/moderation/bulk-tag", post(handlers::moderation::bulk_tag))
        .route("/moderation/bulk-action", post(handlers::moderation::bulk_action))
}

/// Teams and memberships
fn team_routes() -> Router<AppState> {
    use handlers::teams as t;

    Router::new()
        .route("/teams", get(t::list_teams).post(t::create_team))
        .route("/teams/mine", get(t::my_memberships))
        .route("/teams/by-slug/{slug}", get(t::get_team_by_slug))
        .route("/teams/{id}", get(t::get_team))
        .route("/teams/{id}/settings", put(t::update_team_settings))
        .route("/teams/{id}/activate", post(t::activate_team))
        .route("/teams/{id}/deactivate", post(t::deactivate_team))
        .route("/teams/{id}/members", get(t::list_members).post(t::add_member))
        .route(
            "/teams/{id}/members/{user_id}",
            put(t::change_member_role).delete(t::remove_member),
        )
}

fn tag_routes() -> Router<AppState> {
    Router::new().route(
        "/tags",
        get(handlers::tags::list_tags).post(handlers::tags::create_tag),
    )
}

/// Admin endpoints
fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/audit", get(handlers::admin::audit::list_audit))
}
