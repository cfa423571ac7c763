//! # pulsestage-auth
//!
//! Identity and authorization for PulseStage.
//!
//! ## Modules
//!
//! - `rbac`: permission matrix, membership resolver, authorization gate,
//!   scoped query builder
//! - `principal`: authenticated identities and the bootstrap admin key
//! - `jwt`: session token issue and validation
//! - `csrf`: double-submit token helpers

pub mod csrf;
pub mod jwt;
pub mod principal;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use principal::{AdminKey, Principal};
pub use rbac::{
    Action, AuthorizationGate, BulkOp, Decision, DenyReason, MembershipChange, Scope,
    ScopedQueryBuilder, Target, TeamMembershipResolver,
};
