//! # Database Error Types
//!
//! `DbError` classifies sqlx failures into the cases callers branch on:
//! constraint violations (the reconciler's UNIQUE backstop and the child-row
//! foreign keys), missing rows, and everything operational. Higher layers
//! wrap this into `SyncError` and ultimately an HTTP 500 or a non-zero CLI
//! exit.

use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Database operation failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row for the given entity/id pair. Also produced by an UPDATE that
    /// matched zero rows.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected a write. For the listing store this means a
    /// second insert for an `mls_number` that already has a row.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A foreign key rejected a write, e.g. child rows for a property id
    /// that was never inserted.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Could not open the database or obtain a connection.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A schema migration did not apply cleanly.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A statement failed for a reason other than a constraint.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A transaction could not be committed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection was busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Anything sqlx reports that fits none of the above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand for [`DbError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Classifies sqlx errors.
///
/// SQLite reports constraint failures only through message text, with fixed
/// prefixes (`"UNIQUE constraint failed: <table>.<column>"`,
/// `"FOREIGN KEY constraint failed"`), so this matches on those.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}
