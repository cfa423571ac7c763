//! # pulsestage-entity
//!
//! Domain entity models for PulseStage. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`. Every persisted row carries
//! a `tenant_id`.

pub mod audit;
pub mod question;
pub mod tag;
pub mod team;
pub mod tenant;
pub mod user;
