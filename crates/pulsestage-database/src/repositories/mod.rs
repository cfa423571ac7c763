//! PostgreSQL implementations of the store traits.

pub mod audit;
pub mod membership;
pub mod predicate;
pub mod question;
pub mod tag;
pub mod team;
pub mod tenant;
pub mod user;

use std::sync::Arc;

use sqlx::PgPool;

pub use audit::AuditLogRepository;
pub use membership::MembershipRepository;
pub use question::QuestionRepository;
pub use tag::TagRepository;
pub use team::TeamRepository;
pub use tenant::TenantRepository;
pub use user::UserRepository;

use crate::store::Stores;

/// Wire every PostgreSQL repository over one pool.
pub fn postgres_stores(pool: PgPool) -> Stores {
    Stores {
        tenants: Arc::new(TenantRepository::new(pool.clone())),
        users: Arc::new(UserRepository::new(pool.clone())),
        teams: Arc::new(TeamRepository::new(pool.clone())),
        memberships: Arc::new(MembershipRepository::new(pool.clone())),
        questions: Arc::new(QuestionRepository::new(pool.clone())),
        tags: Arc::new(TagRepository::new(pool.clone())),
        audit: Arc::new(AuditLogRepository::new(pool)),
    }
}
