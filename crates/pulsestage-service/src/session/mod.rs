//! Session login and identity lookup.

pub mod service;

pub use service::{LoginResult, SessionInfo, SessionService};
