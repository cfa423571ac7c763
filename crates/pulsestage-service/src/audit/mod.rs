//! Audit recording and listing.

pub mod recorder;
pub mod service;

pub use recorder::{AuditEvent, AuditRecorder};
pub use service::AuditService;
