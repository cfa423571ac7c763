//! End-to-end tests against the HTTP router backed by the in-memory store.

mod helpers;

mod auth_test;
mod moderation_test;
mod question_test;
mod team_test;
mod tenant_test;
