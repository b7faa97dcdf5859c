//! # vista-db: Database Layer for Vista
//!
//! SQLite persistence for the Vista listing store, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Vista Data Flow                                 │
//! │                                                                         │
//! │  Reconciler (vista-sync) / HTTP handler (apps/api)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vista-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (property.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  sync_log.rs)  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ PropertyRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Management    │    │ SyncLogRepo    │    │ 002_idx.sql  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - `DbConfig` / `Database` handle over a SqlitePool
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - `DbError` classification of sqlx failures
//! - [`repository`] - Property and sync-log repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vista_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/vista.db");
//! let db = Database::new(config).await?;
//!
//! let existing = db.properties().find_by_mls_number("MLS-123").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::property::PropertyRepository;
pub use repository::sync_log::SyncLogRepository;
