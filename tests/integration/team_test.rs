//! Team administration and membership management.

use axum::http::StatusCode;
use serde_json::json;

use pulsestage_entity::team::TeamRole;

use crate::helpers::{Auth, TestApp};

#[tokio::test]
async fn test_last_owner_cannot_be_removed() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner@acme.test").await;
    let eng = app.create_team_owned_by("eng", owner).await;
    let token = app.login("owner@acme.test").await;

    let res = app
        .request(
            "DELETE",
            &format!("/api/teams/{eng}/members/{owner}"),
            None,
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "LAST_OWNER_PROTECTED");
}

#[tokio::test]
async fn test_last_owner_cannot_be_demoted_even_with_admin_key() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner@acme.test").await;
    let eng = app.create_team_owned_by("eng", owner).await;

    let res = app
        .request(
            "PUT",
            &format!("/api/teams/{eng}/members/{owner}"),
            Some(json!({ "role": "admin" })),
            Auth::AdminKey,
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "LAST_OWNER_PROTECTED");
}

#[tokio::test]
async fn test_second_owner_can_be_removed() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("owner@acme.test", eng, TeamRole::Owner).await;
    let co_owner = app.create_user("co@acme.test").await;
    app.grant(eng, co_owner, TeamRole::Owner).await;

    let res = app
        .request(
            "DELETE",
            &format!("/api/teams/{eng}/members/{co_owner}"),
            None,
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
}

#[tokio::test]
async fn test_admin_adds_member_by_email() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("lead@acme.test", eng, TeamRole::Admin).await;
    app.create_user("dev@acme.test").await;

    let res = app
        .request(
            "POST",
            &format!("/api/teams/{eng}/members"),
            Some(json!({ "email": "dev@acme.test", "role": "member" })),
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.data()["role"], "member");

    let members = app
        .request(
            "GET",
            &format!("/api/teams/{eng}/members"),
            None,
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(members.status, StatusCode::OK);
    // Founder, lead, and the new member.
    assert_eq!(members.data().as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_moderator_cannot_manage_members() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("mod@acme.test", eng, TeamRole::Moderator).await;
    app.create_user("dev@acme.test").await;

    let res = app
        .request(
            "POST",
            &format!("/api/teams/{eng}/members"),
            Some(json!({ "email": "dev@acme.test", "role": "member" })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_code(), "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("lead@acme.test", eng, TeamRole::Admin).await;
    let dev = app.create_user("dev@acme.test").await;
    app.grant(eng, dev, TeamRole::Member).await;

    let res = app
        .request(
            "PUT",
            &format!("/api/teams/{eng}/members/{dev}"),
            Some(json!({ "role": "superuser" })),
            Auth::Bearer(&token),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "INVALID_ROLE");
}

#[tokio::test]
async fn test_admin_key_creates_team_without_owner() {
    let app = TestApp::new().await;

    let res = app
        .request(
            "POST",
            "/api/teams",
            Some(json!({ "slug": "people-ops", "name": "People Ops" })),
            Auth::AdminKey,
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.data()["slug"], "people-ops");

    let by_slug = app
        .request("GET", "/api/teams/by-slug/people-ops", None, Auth::None)
        .await;
    assert_eq!(by_slug.status, StatusCode::OK);
    assert_eq!(by_slug.data()["name"], "People Ops");
}

#[tokio::test]
async fn test_ownerless_team_takes_an_owner_before_other_members() {
    let app = TestApp::new().await;
    let created = app
        .request(
            "POST",
            "/api/teams",
            Some(json!({ "slug": "people-ops", "name": "People Ops" })),
            Auth::AdminKey,
        )
        .await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.body);
    let team = created.data()["id"].as_str().unwrap().to_string();
    let uri = format!("/api/teams/{team}/members");
    app.create_user("dev@acme.test").await;
    app.create_user("lead@acme.test").await;

    let member_first = app
        .request(
            "POST",
            &uri,
            Some(json!({ "email": "dev@acme.test", "role": "member" })),
            Auth::AdminKey,
        )
        .await;
    assert_eq!(member_first.status, StatusCode::BAD_REQUEST);
    assert_eq!(member_first.error_code(), "LAST_OWNER_PROTECTED");

    let owner = app
        .request(
            "POST",
            &uri,
            Some(json!({ "email": "lead@acme.test", "role": "owner" })),
            Auth::AdminKey,
        )
        .await;
    assert_eq!(owner.status, StatusCode::OK, "{}", owner.body);

    let member = app
        .request(
            "POST",
            &uri,
            Some(json!({ "email": "dev@acme.test", "role": "member" })),
            Auth::AdminKey,
        )
        .await;
    assert_eq!(member.status, StatusCode::OK, "{}", member.body);

    let members = app.request("GET", &uri, None, Auth::AdminKey).await;
    let roles: Vec<_> = members
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(roles.len(), 2);
    assert!(roles.contains(&"owner".to_string()));
}

#[tokio::test]
async fn test_team_admin_creates_team_and_becomes_owner() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (user, token) = app.member("lead@acme.test", eng, TeamRole::Admin).await;

    let res = app
        .request(
            "POST",
            "/api/teams",
            Some(json!({ "slug": "platform", "name": "Platform" })),
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let mine = app
        .request("GET", "/api/teams/mine", None, Auth::Bearer(&token))
        .await;
    let roles: Vec<_> = mine
        .data()
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["user_id"] == json!(user))
        .map(|m| m["role"].as_str().unwrap().to_string())
        .collect();
    assert!(roles.contains(&"owner".to_string()));
}

#[tokio::test]
async fn test_deactivated_team_rejects_questions() {
    let app = TestApp::new().await;
    let eng = app.create_team("eng").await;
    let (_, token) = app.member("lead@acme.test", eng, TeamRole::Admin).await;

    let res = app
        .request(
            "POST",
            &format!("/api/teams/{eng}/deactivate"),
            None,
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["is_active"], false);

    let submit = app
        .request(
            "POST",
            "/api/questions",
            Some(json!({ "body": "Anyone there?", "team_id": eng })),
            Auth::Bearer(&token),
        )
        .await;
    assert_eq!(submit.status, StatusCode::BAD_REQUEST);
}
