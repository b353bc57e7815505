//! # Database Migrations
//!
//! Embedded SQL migrations. The `sqlx::migrate!()` macro compiles every
//! file under `migrations/sqlite/` into the binary; applied versions are
//! tracked in `_sqlx_migrations`.
//!
//! ## Adding New Migrations
//!
//! 1. Add `NNN_description.sql` with the next sequence number.
//! 2. Never modify an existing migration; always add a new one.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations in order. Idempotent; each
/// migration runs inside its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}
