//! Tenant lookup and settings.

pub mod service;

pub use service::TenantService;
