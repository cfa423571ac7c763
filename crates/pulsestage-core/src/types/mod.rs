//! Core type definitions used across the PulseStage workspace.

pub mod id;
pub mod pagination;
pub mod predicate;
pub mod tenant_scope;

pub use id::*;
pub use pagination::{PageRequest, PageResponse};
pub use predicate::{QueryPredicate, TeamFilter};
pub use tenant_scope::TenantScope;
