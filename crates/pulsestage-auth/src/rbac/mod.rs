//! Team-scoped role-based access control.
//!
//! - `policies`: the permission matrix
//! - `resolver`: per-team effective role lookup
//! - `enforcer`: the authorization gate
//! - `scope`: allow scopes and the scoped query builder
//! - `decision`: allow/deny outcomes and deny reasons
//! - `target`: what a request acts on

pub mod decision;
pub mod enforcer;
pub mod policies;
pub mod resolver;
pub mod scope;
pub mod target;

pub use decision::{Decision, DenyReason};
pub use enforcer::AuthorizationGate;
pub use policies::{Action, BulkOp, Requirement};
pub use resolver::TeamMembershipResolver;
pub use scope::{Scope, ScopedQueryBuilder};
pub use target::{MembershipChange, Resource, Target};
