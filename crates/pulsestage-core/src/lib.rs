//! # pulsestage-core
//!
//! Core crate for PulseStage. Contains configuration schemas, typed
//! identifiers, tenant scoping primitives, pagination, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other PulseStage crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::{QueryPredicate, TeamFilter, TenantScope};
