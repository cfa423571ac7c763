//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use pulsestage_auth::jwt::{JwtDecoder, JwtEncoder};
use pulsestage_auth::principal::AdminKey;
use pulsestage_auth::rbac::AuthorizationGate;
use pulsestage_core::config::AppConfig;
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_database::{DatabasePool, Stores};
use pulsestage_service::{
    AuditRecorder, AuditService, MemberService, ModerationService, QuestionService, SessionService,
    TagService, TeamService, TenantService,
};

/// How long a resolved tenant slug stays cached.
const TENANT_CACHE_TTL: Duration = Duration::from_secs(60);
const TENANT_CACHE_CAPACITY: u64 = 10_000;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheaply cloneable.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool; `None` when running on the in-memory store.
    pub db: Option<DatabasePool>,
    /// Every store trait object.
    pub stores: Stores,
    /// Tenant slug to scope, filled by the tenant middleware.
    pub tenant_cache: Cache<String, TenantScope>,

    // ── Auth ─────────────────────────────────────────────────
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Bootstrap admin key, if configured.
    pub admin_key: Option<Arc<AdminKey>>,
    pub gate: AuthorizationGate,

    // ── Services ─────────────────────────────────────────────
    pub tenant_service: Arc<TenantService>,
    pub session_service: Arc<SessionService>,
    pub question_service: Arc<QuestionService>,
    pub moderation_service: Arc<ModerationService>,
    pub team_service: Arc<TeamService>,
    pub member_service: Arc<MemberService>,
    pub tag_service: Arc<TagService>,
    pub audit_service: Arc<AuditService>,
}

impl AppState {
    /// Wire every service on top of `stores`.
    pub fn new(config: AppConfig, stores: Stores, db: Option<DatabasePool>) -> Self {
        let gate = AuthorizationGate::new(Arc::clone(&stores.memberships));
        let recorder = AuditRecorder::new(Arc::clone(&stores.audit));
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let admin_key = config
            .auth
            .admin_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(|k| Arc::new(AdminKey::new(k)));

        let tenant_service = Arc::new(TenantService::new(
            Arc::clone(&stores.tenants),
            recorder.clone(),
        ));
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&stores.users),
            Arc::clone(&stores.memberships),
            jwt_encoder,
        ));
        let question_service = Arc::new(QuestionService::new(
            Arc::clone(&stores.questions),
            Arc::clone(&stores.tenants),
            Arc::clone(&stores.teams),
        ));
        let moderation_service = Arc::new(ModerationService::new(
            Arc::clone(&stores.questions),
            Arc::clone(&stores.tags),
            gate.clone(),
            recorder.clone(),
        ));
        let team_service = Arc::new(TeamService::new(
            Arc::clone(&stores.teams),
            gate.clone(),
            recorder.clone(),
        ));
        let member_service = Arc::new(MemberService::new(
            Arc::clone(&stores.teams),
            Arc::clone(&stores.users),
            Arc::clone(&stores.memberships),
            gate.clone(),
            recorder.clone(),
        ));
        let tag_service = Arc::new(TagService::new(
            Arc::clone(&stores.tags),
            gate.clone(),
            recorder,
        ));
        let audit_service = Arc::new(AuditService::new(Arc::clone(&stores.audit), gate.clone()));

        let tenant_cache = Cache::builder()
            .max_capacity(TENANT_CACHE_CAPACITY)
            .time_to_live(TENANT_CACHE_TTL)
            .build();

        Self {
            config: Arc::new(config),
            db,
            stores,
            tenant_cache,
            jwt_decoder,
            admin_key,
            gate,
            tenant_service,
            session_service,
            question_service,
            moderation_service,
            team_service,
            member_service,
            tag_service,
            audit_service,
        }
    }
}
