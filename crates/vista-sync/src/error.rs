//! # Sync Error Types
//!
//! Error types for feed access and reconciliation.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Feed        │  │      Store              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  FeedRequest    │  │  Database (wraps        │ │
//! │  │  ConfigLoad     │  │  FeedStatus     │  │  vista_db::DbError)     │ │
//! │  │  InvalidUrl     │  │  FeedDecode     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  The vendor TRANSFORM has no error category: it is total and           │
//! │  degrades bad input to defaults (see vista-core).                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any of these raised mid-run aborts the run; the reconciler records the
//! message in the sync log before propagating.

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering feed, store and configuration failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Invalid feed URL.
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Feed Errors
    // =========================================================================
    /// The HTTP request to the vendor feed failed outright.
    #[error("Feed request failed: {0}")]
    FeedRequestFailed(String),

    /// The vendor feed answered with a non-success HTTP status.
    #[error("Feed returned HTTP {status}")]
    FeedStatus { status: u16 },

    /// The vendor feed body could not be decoded as a listing page.
    #[error("Feed response could not be decoded: {0}")]
    FeedDecodeFailed(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    /// A database operation failed; the run aborts and the error message is
    /// recorded in the sync log.
    #[error("Store operation failed: {0}")]
    Database(#[from] vista_db::DbError),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::FeedDecodeFailed(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::FeedStatus {
                status: status.as_u16(),
            }
        } else {
            SyncError::FeedRequestFailed(err.to_string())
        }
    }
}
