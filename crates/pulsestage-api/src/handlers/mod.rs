//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod health;
pub mod moderation;
pub mod questions;
pub mod tags;
pub mod teams;
pub mod tenant;
