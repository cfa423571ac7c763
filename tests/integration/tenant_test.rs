//! Tenant resolution and cross-tenant isolation.

use axum::body::Body;
use axum::http::{Request, StatusCode};

use pulsestage_entity::question::QuestionStatus;

use crate::helpers::{ADMIN_KEY, Auth, TestApp};

#[tokio::test]
async fn test_health_needs_no_tenant() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["status"], "ok");
    assert_eq!(res.data()["database"], "in_memory");
}

#[tokio::test]
async fn test_unknown_tenant_is_not_found() {
    let app = TestApp::new().await;

    let res = app
        .request_in("initech", "GET", "/api/questions", None, Auth::None)
        .await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error_code(), "TENANT_UNRESOLVED");
}

#[tokio::test]
async fn test_missing_tenant_is_not_found() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/api/questions")
        .body(Body::empty())
        .unwrap();

    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error_code(), "TENANT_UNRESOLVED");
}

#[tokio::test]
async fn test_subdomain_selects_tenant() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/api/tenant")
        .header("host", "globex.pulsestage.app")
        .header("x-admin-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();

    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["slug"], "globex");
}

#[tokio::test]
async fn test_token_from_other_tenant_is_not_found() {
    let app = TestApp::new().await;
    app.create_user_in(app.other.id, "spy@globex.test").await;
    let token = app.login_in(&app.other.slug, "spy@globex.test").await;

    let res = app
        .request("GET", "/api/auth/me", None, Auth::Bearer(&token))
        .await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error_code(), "CROSS_TENANT");
}

#[tokio::test]
async fn test_questions_do_not_leak_across_tenants() {
    let app = TestApp::new().await;
    let question = app.question(None, QuestionStatus::Open).await;

    let listed = app
        .request_in(&app.other.slug, "GET", "/api/questions", None, Auth::None)
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.data()["total"], 0);

    let fetched = app
        .request_in(
            &app.other.slug,
            "GET",
            &format!("/api/questions/{question}"),
            None,
            Auth::None,
        )
        .await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_same_email_logs_into_each_tenant_separately() {
    let app = TestApp::new().await;
    app.create_user("sam@example.test").await;
    app.create_user_in(app.other.id, "sam@example.test").await;

    let acme = app.login("sam@example.test").await;
    let globex = app.login_in(&app.other.slug, "sam@example.test").await;

    assert_ne!(acme, globex);
    let res = app
        .request_in(&app.other.slug, "GET", "/api/auth/me", None, Auth::Bearer(&globex))
        .await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_plain_not_found() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/nope", None, Auth::None).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_ne!(res.error_code(), "TENANT_UNRESOLVED");
}
