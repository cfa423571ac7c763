//! Question submission, upvotes, and per-question moderation gates.

use axum::http::StatusCode;
use serde_json::json;

use pulsestage_entity::question::{MAX_BODY_CHARS, QuestionStatus};
use pulsestage_entity::team::TeamRole;

use crate::helpers::{Auth, TestApp};

#[tokio::test]
async fn test_member_cannot_respond() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("dev@acme.test", eng, TeamRole::Member).await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;

    let res = app
        .request(
            "POST",
            &format!("/api/questions/{question}/respond"),
            Some(json!({ "response": "Soon." })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_code(), "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_moderator_of_other_team_cannot_respond() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let sales = app.create_team("sales").await;
    let (_, token) = app.member("mod@acme.test", sales, TeamRole::Moderator).await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;

    let res = app
        .request(
            "POST",
            &format!("/api/questions/{question}/respond"),
            Some(json!({ "response": "Soon." })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_code(), "NOT_A_MEMBER");
}

#[tokio::test]
async fn test_unauthenticated_respond_is_rejected() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;

    let res = app
        .request(
            "POST",
            &format!("/api/questions/{question}/respond"),
            Some(json!({ "response": "Soon." })),
            Auth::None,
        )
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error_code(), "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_moderator_responds_and_action_is_audited() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (user, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;

    let res = app
        .request(
            "POST",
            &format!("/api/questions/{question}/respond"),
            Some(json!({ "response": "Next Monday." })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.data()["status"], "ANSWERED");
    assert_eq!(res.data()["response_text"], "Next Monday.");
    assert_eq!(app.wait_for_audit(1).await, 1);

    let admin_key_view = app
        .request("GET", "/api/admin/audit", None, Auth::AdminKey)
        .await;
    assert_eq!(admin_key_view.status, StatusCode::OK);
    let entries = admin_key_view.data()["items"].as_array().unwrap();
    assert_eq!(entries[0]["action"], "question.respond");
    assert_eq!(entries[0]["actor_id"], json!(user));
}

#[tokio::test]
async fn test_denied_action_writes_no_audit_entry() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("dev@acme.test", eng, TeamRole::Member).await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;

    let res = app
        .request(
            "POST",
            &format!("/api/questions/{question}/pin"),
            None,
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(app.store.audit_len().await, 0);
}

#[tokio::test]
async fn test_upvote_is_idempotent() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;
    let token = app.login("ada@acme.test").await;
    let question = app.question(None, QuestionStatus::Open).await;
    let uri = format!("/api/questions/{question}/upvote");

    let first = app.request("POST", &uri, None, Auth::Bearer(&token)).await;
    let second = app.request("POST", &uri, None, Auth::Bearer(&token)).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["upvotes"], 1);
    assert_eq!(first.data()["already_upvoted"], false);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["upvotes"], 1);
    assert_eq!(second.data()["already_upvoted"], true);
}

#[tokio::test]
async fn test_frozen_question_rejects_upvotes() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, mod_token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;

    let freeze = app
        .request(
            "POST",
            &format!("/api/questions/{question}/freeze"),
            None,
            Auth::Bearer(&mod_token),
        )
        .await;
    assert_eq!(freeze.status, StatusCode::OK);

    let res = app
        .request(
            "POST",
            &format!("/api/questions/{question}/upvote"),
            None,
            Auth::Bearer(&mod_token),
        )
        .await;

    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.error_code(), "QUESTION_FROZEN");
}

#[tokio::test]
async fn test_repeat_upvote_after_freeze_reports_already_upvoted() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, mod_token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    app.create_user("ada@acme.test").await;
    let token = app.login("ada@acme.test").await;
    let question = app.question(Some(eng), QuestionStatus::Open).await;
    let uri = format!("/api/questions/{question}/upvote");

    let first = app.request("POST", &uri, None, Auth::Bearer(&token)).await;
    assert_eq!(first.status, StatusCode::OK);

    let freeze = app
        .request(
            "POST",
            &format!("/api/questions/{question}/freeze"),
            None,
            Auth::Bearer(&mod_token),
        )
        .await;
    assert_eq!(freeze.status, StatusCode::OK);

    let repeat = app.request("POST", &uri, None, Auth::Bearer(&token)).await;
    assert_eq!(repeat.status, StatusCode::OK, "{}", repeat.body);
    assert_eq!(repeat.data()["upvotes"], 1);
    assert_eq!(repeat.data()["already_upvoted"], true);
}

#[tokio::test]
async fn test_question_under_review_cannot_be_upvoted() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;
    let token = app.login("ada@acme.test").await;
    let question = app.question(None, QuestionStatus::UnderReview).await;

    let res = app
        .request(
            "POST",
            &format!("/api/questions/{question}/upvote"),
            None,
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_list_hides_questions_under_review() {
    let app = TestApp::new().await;
    app.question(None, QuestionStatus::Open).await;
    app.question(None, QuestionStatus::UnderReview).await;

    let res = app.request("GET", "/api/questions", None, Auth::None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total"], 1);
    assert_eq!(res.data()["items"][0]["status"], "OPEN");
}

#[tokio::test]
async fn test_submit_rejects_empty_body() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;
    let token = app.login("ada@acme.test").await;

    let res = app
        .request(
            "POST",
            "/api/questions",
            Some(json!({ "body": "" })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_submit_rejects_overlong_body() {
    let app = TestApp::new().await;
    app.create_user("ada@acme.test").await;
    let token = app.login("ada@acme.test").await;
    let body = "a".repeat(MAX_BODY_CHARS + 1);

    let res = app
        .request(
            "POST",
            "/api/questions",
            Some(json!({ "body": body })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}
