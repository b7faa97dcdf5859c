//! # Error Types
//!
//! Domain-specific error types for vista-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vista-core errors (this file)                                         │
//! │  └── CoreError        - Domain-level failures                          │
//! │                                                                         │
//! │  vista-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vista-sync errors (separate crate)                                    │
//! │  └── SyncError        - Feed + reconciliation failures                 │
//! │                                                                         │
//! │  Flow: CoreError → DbError/SyncError → HTTP 500 / CLI exit code        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note: the vendor transform itself is total and never returns an error.
//! Malformed vendor input degrades to documented defaults instead.

use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored status string does not match any known lifecycle status.
    ///
    /// ## When This Occurs
    /// - Decoding a `status` column written by an older/newer schema
    /// - Parsing user-supplied status filters
    ///
    /// Vendor statuses never hit this path: unknown vendor values are
    /// normalized to `active` by the transform.
    #[error("Unknown property status: '{0}'")]
    UnknownStatus(String),

    /// A stored sync-log status string is not one of the known run states.
    #[error("Unknown sync status: '{0}'")]
    UnknownSyncStatus(String),
}
