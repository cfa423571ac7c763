//! Moderation queue scoping, stats, and bulk operations.

use std::collections::HashSet;

use axum::http::StatusCode;
use serde_json::{Value, json};

use pulsestage_core::types::id::QuestionId;
use pulsestage_entity::question::QuestionStatus;
use pulsestage_entity::team::TeamRole;

use crate::helpers::{Auth, TestApp};

fn ids(page: &Value) -> HashSet<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_admin_of_two_teams_sees_both_queues() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let sales = app.create_team("sales").await;
    let (admin, token) = app.member("lead@acme.test", eng, TeamRole::Admin).await;
    app.grant(sales, admin, TeamRole::Admin).await;
    let q_eng = app.question(Some(eng), QuestionStatus::UnderReview).await;
    let q_sales = app.question(Some(sales), QuestionStatus::Open).await;

    let res = app
        .request("GET", "/api/moderation/queue", None, Auth::Bearer(&token))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let seen = ids(res.data());
    assert_eq!(seen.len(), 2);
    assert!(seen.contains(&q_eng.to_string()));
    assert!(seen.contains(&q_sales.to_string()));
}

#[tokio::test]
async fn test_moderator_queue_is_limited_to_own_teams() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let sales = app.create_team("sales").await;
    let (_, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    let own = app.question(Some(eng), QuestionStatus::Open).await;
    app.question(Some(sales), QuestionStatus::Open).await;

    let res = app
        .request("GET", "/api/moderation/queue", None, Auth::Bearer(&token))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total"], 1);
    assert_eq!(ids(res.data()), HashSet::from([own.to_string()]));
}

#[tokio::test]
async fn test_queue_filter_on_foreign_team_is_empty() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let sales = app.create_team("sales").await;
    let (_, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    app.question(Some(sales), QuestionStatus::Open).await;

    let res = app
        .request(
            "GET",
            &format!("/api/moderation/queue?team_id={sales}"),
            None,
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total"], 0);
}

#[tokio::test]
async fn test_member_cannot_view_queue() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("dev@acme.test", eng, TeamRole::Member).await;

    let res = app
        .request("GET", "/api/moderation/queue", None, Auth::Bearer(&token))
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_code(), "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_user_without_teams_cannot_view_queue() {
    let app = TestApp::new().await;
    app.create_user("new@acme.test").await;
    let token = app.login("new@acme.test").await;

    let res = app
        .request("GET", "/api/moderation/queue", None, Auth::Bearer(&token))
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_code(), "NOT_A_MEMBER");
}

#[tokio::test]
async fn test_stats_count_only_moderated_teams() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let sales = app.create_team("sales").await;
    let (_, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    app.question(Some(eng), QuestionStatus::Open).await;
    app.question(Some(eng), QuestionStatus::UnderReview).await;
    app.question(Some(sales), QuestionStatus::Open).await;

    let res = app
        .request("GET", "/api/moderation/stats", None, Auth::Bearer(&token))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total"], 2);
    assert_eq!(res.data()["open"], 1);
    assert_eq!(res.data()["under_review"], 1);
}

#[tokio::test]
async fn test_bulk_tag_reports_per_item_failures() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let sales = app.create_team("sales").await;
    let (_, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    let own = app.question(Some(eng), QuestionStatus::Open).await;
    let foreign = app.question(Some(sales), QuestionStatus::Open).await;
    let missing = QuestionId::new();
    let tag = app.tag("roadmap").await;

    let res = app
        .request(
            "POST",
            "/api/moderation/bulk-tag",
            Some(json!({ "question_ids": [own, foreign, missing], "tag_id": tag })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let data = res.data();
    assert_eq!(data["total"], 3);
    assert_eq!(data["success_count"], 1);
    assert_eq!(data["error_count"], 2);
    let results = data["results"].as_array().unwrap();
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["code"], "NOT_A_MEMBER");
    assert_eq!(results[2]["success"], false);
}

#[tokio::test]
async fn test_bulk_delete_requires_admin() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;

    let res = app
        .request(
            "POST",
            "/api/moderation/bulk-action",
            Some(json!({ "question_ids": [question], "action": "delete" })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_code(), "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_bulk_pin_by_moderator() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;

    let res = app
        .request(
            "POST",
            "/api/moderation/bulk-action",
            Some(json!({ "question_ids": [question], "action": "pin" })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["success_count"], 1);

    let fetched = app
        .request("GET", &format!("/api/questions/{question}"), None, Auth::None)
        .await;
    assert_eq!(fetched.data()["is_pinned"], true);
}

#[tokio::test]
async fn test_bulk_rejects_empty_batch() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;

    let res = app
        .request(
            "POST",
            "/api/moderation/bulk-action",
            Some(json!({ "question_ids": [], "action": "pin" })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}
