//! # Database Pool Management
//!
//! Pool construction and the [`Database`] handle the rest of the workspace
//! talks to.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  API server / mls-sync CLI startup                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new("vista.db") ──► Database::new(config).await              │
//! │                                     │                                   │
//! │                                     ├── open SqlitePool (WAL mode)      │
//! │                                     ├── run embedded migrations         │
//! │                                     ▼                                   │
//! │                                Database handle                          │
//! │                                     │                                   │
//! │            db.properties()  db.sync_logs()  db.health_check()           │
//! │                                                                         │
//! │  A sync run writes on one connection while the status endpoint          │
//! │  reads on another; WAL keeps readers from blocking the writer.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::property::PropertyRepository;
use crate::repository::sync_log::SyncLogRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool configuration, builder style.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file (created on first connect).
    pub path: PathBuf,

    /// Pool size ceiling. Default 5: one writer for the sync run plus
    /// headroom for concurrent status/health reads.
    pub max_connections: u32,

    /// Connections kept warm. Default 1.
    pub min_connections: u32,

    /// How long to wait for a free connection before failing the acquire.
    pub acquire_timeout: Duration,

    /// Whether `Database::new` runs pending migrations. Default true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration for a file-backed database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Configuration for an isolated in-memory database.
    ///
    /// Capped at one connection: each SQLite `:memory:` connection is its own
    /// database, so a second pooled connection would see an empty schema.
    pub fn in_memory() -> Self {
        DbConfig {
            path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Sets the pool size ceiling.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the number of connections kept warm.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Disables automatic migration on connect.
    pub fn skip_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the listing store. Cheap to clone; clones share one pool.
///
/// Repositories are handed out per call rather than stored, so the handle
/// stays a plain pool wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and (by default) brings the schema up to date.
    ///
    /// SQLite is configured with WAL journaling, NORMAL synchronous, and
    /// foreign key enforcement (off by default in SQLite, and the child
    /// tables rely on it).
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.path.display(), "Opening database");

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        info!(max_connections = config.max_connections, "Database ready");
        Ok(db)
    }

    /// Applies pending migrations. Idempotent; `new()` calls this unless the
    /// config opts out.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool access for queries the repositories don't cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Property repository over this pool.
    pub fn properties(&self) -> PropertyRepository {
        PropertyRepository::new(self.pool.clone())
    }

    /// Sync log repository over this pool.
    pub fn sync_logs(&self) -> SyncLogRepository {
        SyncLogRepository::new(self.pool.clone())
    }

    /// Closes the pool; subsequent repository calls fail.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// True when the database can still execute a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
