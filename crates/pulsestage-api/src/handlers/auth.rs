//! Session handlers: login, logout, me.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde_json::{Value, json};

use crate::dto::request::{LoginRequest, validated};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// POST /api/auth/login
///
/// Returns the session token in the body and sets it as an HttpOnly cookie,
/// alongside a script-readable CSRF cookie.
pub async fn login(
    State(state): State<AppState>,
    ctx: MaybeAuthUser,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let req = validated(req)?;
    let result = state.session_service.login(&ctx.tenant, &req.email).await?;

    let auth = &state.config.auth;
    let session = Cookie::build((auth.session_cookie.clone(), result.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    let csrf = Cookie::build((auth.csrf_cookie.clone(), result.csrf_token.clone()))
        .path("/")
        .same_site(SameSite::Strict)
        .build();

    let body = LoginResponse {
        token: result.token,
        expires_at: result.expires_at,
        csrf_token: result.csrf_token,
        user: result.user,
    };
    Ok((jar.add(session).add(csrf), Json(ApiResponse::ok(body))))
}

/// POST /api/auth/logout
///
/// Tokens are stateless, so logging out clears the cookies only. Expired
/// cookies are always sent, whether or not the request carried any.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<MessageResponse>>) {
    let auth = &state.config.auth;
    let jar = jar
        .add(expired_cookie(auth.session_cookie.clone()))
        .add(expired_cookie(auth.csrf_cookie.clone()));
    (
        jar,
        Json(ApiResponse::ok(MessageResponse {
            message: "Logged out".to_string(),
        })),
    )
}

fn expired_cookie(name: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Value>, ApiError> {
    let info = state.session_service.me(&auth).await?;
    Ok(Json(json!({ "success": true, "data": info })))
}
