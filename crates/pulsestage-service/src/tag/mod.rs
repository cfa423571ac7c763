//! Question tags.

pub mod service;

pub use service::TagService;
