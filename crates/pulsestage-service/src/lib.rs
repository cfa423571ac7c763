//! # pulsestage-service
//!
//! Business logic for PulseStage. Each service takes the store traits it
//! needs plus the authorization gate, asks the gate before every privileged
//! operation, and hands the resulting predicate to the store.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time as `Arc`s.

pub mod audit;
pub mod context;
pub mod moderation;
pub mod question;
pub mod session;
pub mod tag;
pub mod team;
pub mod tenant;

pub use audit::{AuditEvent, AuditRecorder, AuditService};
pub use context::RequestContext;
pub use moderation::{BulkResult, ModerationService};
pub use question::QuestionService;
pub use session::SessionService;
pub use tag::TagService;
pub use team::{MemberService, TeamService};
pub use tenant::TenantService;
