//! # pulsestage-database
//!
//! Persistence for PulseStage: the store traits every service depends on,
//! their PostgreSQL implementations, an in-memory implementation, the
//! connection pool and the migration runner.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use repositories::postgres_stores;
pub use store::Stores;
