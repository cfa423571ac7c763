//! Session login, credential handling, and CSRF.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{Auth, TestApp, cookie_value};

#[tokio::test]
async fn test_login_returns_token_and_sets_cookies() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;

    let res = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "ada@acme.test" })),
            Auth::None,
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.data()["token"].as_str().is_some());
    assert_eq!(res.data()["user"]["email"], "ada@acme.test");
    assert!(cookie_value(&res.set_cookies, "pulsestage_session").is_some());
    assert_eq!(
        cookie_value(&res.set_cookies, "pulsestage_csrf").as_deref(),
        res.data()["csrf_token"].as_str()
    );
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let app = TestApp::new().await;

    let res = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@acme.test" })),
            Auth::None,
        )
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/auth/me", None, Auth::None).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error_code(), "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_me_lists_memberships() {
    let app = TestApp::new().await;
    let team = app.create_team("eng").await;
    let (_, token) = app
        .member("mod@acme.test", team, pulsestage_entity::team::TeamRole::Moderator)
        .await;

    let res = app.request("GET", "/api/auth/me", None, Auth::Bearer(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    let memberships = res.data()["memberships"].as_array().unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0]["role"], "moderator");
}

#[tokio::test]
async fn test_malformed_bearer_token_is_rejected() {
    let app = TestApp::new().await;

    let res = app
        .request("GET", "/api/auth/me", None, Auth::Bearer("not-a-jwt"))
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_mutation_without_csrf_is_forbidden() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;
    let token = app.login("ada@acme.test").await;

    let res = app
        .request(
            "POST",
            "/api/questions",
            Some(json!({ "body": "Is the cafeteria reopening?" })),
            Auth::Cookie {
                session: &token,
                csrf: None,
            },
        )
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_code(), "CSRF_MISMATCH");
}

#[tokio::test]
async fn test_cookie_mutation_with_matching_csrf_succeeds() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;
    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "ada@acme.test" })),
            Auth::None,
        )
        .await;
    let token = login.data()["token"].as_str().unwrap().to_string();
    let csrf = login.data()["csrf_token"].as_str().unwrap().to_string();

    let res = app
        .request(
            "POST",
            "/api/questions",
            Some(json!({ "body": "Is the cafeteria reopening?" })),
            Auth::Cookie {
                session: &token,
                csrf: Some(&csrf),
            },
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.data()["status"], "OPEN");
}

#[tokio::test]
async fn test_cookie_reads_skip_csrf() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;
    let token = app.login("ada@acme.test").await;

    let res = app
        .request(
            "GET",
            "/api/auth/me",
            None,
            Auth::Cookie {
                session: &token,
                csrf: None,
            },
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_bearer_mutation_skips_csrf() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;
    let token = app.login("ada@acme.test").await;

    let res = app
        .request(
            "POST",
            "/api/questions",
            Some(json!({ "body": "Will there be a summer party?" })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookies() {
    let app = TestApp::new().await;

    let res = app.request("POST", "/api/auth/logout", None, Auth::None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(cookie_value(&res.set_cookies, "pulsestage_session").as_deref(), Some(""));
    assert_eq!(cookie_value(&res.set_cookies, "pulsestage_csrf").as_deref(), Some(""));
    assert!(res.set_cookies.iter().all(|c| c.contains("Max-Age=0")));
}
