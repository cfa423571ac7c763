//! Embedded schema migrations.

use sqlx::PgPool;
use tracing::info;

use pulsestage_core::error::{AppError, ErrorKind};
use pulsestage_core::result::AppResult;

/// Apply every pending migration from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
        })?;

    info!("Database schema is up to date");
    Ok(())
}
