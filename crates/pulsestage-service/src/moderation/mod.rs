//! Moderator operations on questions.

pub mod bulk;
pub mod service;

pub use bulk::{BulkItemResult, BulkResult};
pub use service::{ModerationQueueQuery, ModerationService};
