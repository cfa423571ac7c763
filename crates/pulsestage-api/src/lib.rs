//! # pulsestage-api
//!
//! HTTP API layer for PulseStage built on Axum.
//!
//! Provides the REST endpoints, tenant resolution, identity extractors,
//! DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Backend, build_app, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
