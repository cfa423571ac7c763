//! Admin-only handlers.

pub mod audit;
