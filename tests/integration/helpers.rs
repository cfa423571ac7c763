//! Shared test helpers for integration tests.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use pulsestage_api::{AppState, build_app};
use pulsestage_core::config::AppConfig;
use pulsestage_core::types::id::{QuestionId, TagId, TeamId, UserId};
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_database::MemoryStore;
use pulsestage_database::store::Stores;
use pulsestage_entity::question::{CreateQuestion, Question, QuestionStatus};
use pulsestage_entity::tag::CreateTag;
use pulsestage_entity::team::{CreateTeam, TeamRole};
use pulsestage_entity::tenant::Tenant;
use pulsestage_entity::user::CreateUser;

/// Bootstrap credential accepted by every test app.
pub const ADMIN_KEY: &str = "test-admin-key";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for seeding and inspection
    pub store: MemoryStore,
    pub stores: Stores,
    /// The tenant most tests run in
    pub tenant: Tenant,
    /// A second tenant for isolation checks
    pub other: Tenant,
}

/// Parsed response from a test request
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookies: Vec<String>,
}

impl TestResponse {
    /// The `error` code of a failure body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// The `data` payload of a success body.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

/// How a request authenticates.
#[derive(Clone, Copy)]
pub enum Auth<'a> {
    None,
    Bearer(&'a str),
    AdminKey,
    /// Session cookie plus an optional CSRF cookie/header pair.
    Cookie {
        session: &'a str,
        csrf: Option<&'a str>,
    },
}

impl TestApp {
    /// Create a new test application with two tenants, `acme` and `globex`.
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let tenant = store.insert_tenant("acme", "Acme Corp").await;
        let other = store.insert_tenant("globex", "Globex").await;

        let mut config = AppConfig::default();
        config.tenant.allow_header_override = true;
        config.auth.admin_key = Some(ADMIN_KEY.to_string());
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let stores = store.stores();
        let state = AppState::new(config, stores.clone(), None);
        let router = build_app(state);

        Self {
            router,
            store,
            stores,
            tenant,
            other,
        }
    }

    pub fn scope(&self) -> TenantScope {
        TenantScope::new(self.tenant.id)
    }

    /// Send a request to the `acme` tenant.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        auth: Auth<'_>,
    ) -> TestResponse {
        self.request_in(&self.tenant.slug, method, uri, body, auth)
            .await
    }

    /// Send a request to the tenant named by `slug`.
    pub async fn request_in(
        &self,
        slug: &str,
        method: &str,
        uri: &str,
        body: Option<Value>,
        auth: Auth<'_>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-tenant-id", slug);

        match auth {
            Auth::None => {}
            Auth::Bearer(token) => {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            Auth::AdminKey => {
                builder = builder.header("x-admin-key", ADMIN_KEY);
            }
            Auth::Cookie { session, csrf } => {
                let mut cookie = format!("pulsestage_session={session}");
                if let Some(csrf) = csrf {
                    cookie.push_str(&format!("; pulsestage_csrf={csrf}"));
                    builder = builder.header("x-csrf-token", csrf);
                }
                builder = builder.header(header::COOKIE, cookie);
            }
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    /// Send a fully built request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            body,
            set_cookies,
        }
    }

    /// Log in through the API and return the session token.
    pub async fn login(&self, email: &str) -> String {
        self.login_in(&self.tenant.slug, email).await
    }

    pub async fn login_in(&self, slug: &str, email: &str) -> String {
        let res = self
            .request_in(
                slug,
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email })),
                Auth::None,
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.data()["token"].as_str().unwrap().to_string()
    }

    /// Create a team owned by a founder that tests never log in as.
    pub async fn create_team(&self, slug: &str) -> TeamId {
        let founder = self.create_user(&format!("founder.{slug}@acme.test")).await;
        self.create_team_owned_by(slug, founder).await
    }

    pub async fn create_team_owned_by(&self, slug: &str, owner: UserId) -> TeamId {
        self.stores
            .teams
            .create(
                &self.scope(),
                &CreateTeam {
                    slug: slug.to_string(),
                    name: slug.to_uppercase(),
                    description: None,
                },
                Some(owner),
            )
            .await
            .unwrap()
            .id
    }

    pub async fn create_user(&self, email: &str) -> UserId {
        self.create_user_in(self.tenant.id, email).await
    }

    pub async fn create_user_in(
        &self,
        tenant: pulsestage_core::types::id::TenantId,
        email: &str,
    ) -> UserId {
        self.stores
            .users
            .create(
                &TenantScope::new(tenant),
                &CreateUser {
                    email: email.to_string(),
                    name: email.split('@').next().unwrap_or(email).to_string(),
                    sso_id: None,
                    primary_team_id: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    pub async fn grant(&self, team: TeamId, user: UserId, role: TeamRole) {
        self.stores
            .memberships
            .add(&self.scope(), team, user, role)
            .await
            .unwrap();
    }

    /// Create a user holding `role` in `team` and log them in.
    pub async fn member(&self, email: &str, team: TeamId, role: TeamRole) -> (UserId, String) {
        let user = self.create_user(email).await;
        self.grant(team, user, role).await;
        let token = self.login(email).await;
        (user, token)
    }

    pub async fn question(&self, team: Option<TeamId>, status: QuestionStatus) -> QuestionId {
        let question = Question::new(
            self.tenant.id,
            CreateQuestion {
                team_id: team,
                author_id: None,
                body: "When does the new office open?".to_string(),
            },
            status,
        );
        self.stores
            .questions
            .insert(&self.scope(), &question)
            .await
            .unwrap()
            .id
    }

    pub async fn tag(&self, name: &str) -> TagId {
        self.stores
            .tags
            .create(
                &self.scope(),
                &CreateTag {
                    name: name.to_string(),
                    color: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    /// Wait until at least `count` audit entries exist. Audit writes are
    /// detached from the request, so they may land after the response.
    pub async fn wait_for_audit(&self, count: usize) -> usize {
        for _ in 0..50 {
            let len = self.store.audit_len().await;
            if len >= count {
                return len;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.store.audit_len().await
    }
}

/// Extract a cookie value from `Set-Cookie` headers.
pub fn cookie_value(set_cookies: &[String], name: &str) -> Option<String> {
    set_cookies.iter().find_map(|c| {
        let pair = c.split(';').next()?;
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}
