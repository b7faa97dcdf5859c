//! # Database Migrations
//!
//! Embedded SQL migrations for the listing store schema.
//!
//! To change the schema, add a new `NNN_description.sql` file under
//! `migrations/sqlite/` with the next sequence number. Applied migrations are
//! tracked in `_sqlx_migrations`; never edit a file that has shipped.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// All SQL files under `migrations/sqlite`, embedded at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in filename order, each in its own transaction.
///
/// Idempotent: already-applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(
        available = MIGRATOR.migrations.len(),
        "Applying database migrations"
    );
    MIGRATOR.run(pool).await?;
    Ok(())
}
