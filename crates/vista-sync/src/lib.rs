//! # vista-sync: MLS Reconciliation Engine
//!
//! This crate pulls listings from the external MLS vendor feed and reconciles
//! them against the local property store.
//!
//! ## Reconciliation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Reconciliation Run                             │
//! │                                                                         │
//! │  sync_listings(options)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  open sync log entry (in_progress)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌── page = 1 ─────────────────────────────────────────────────┐       │
//! │  │   fetch_listings(page, limit, status)                       │       │
//! │  │       │                                                     │       │
//! │  │       ▼  per listing (sequential)                           │       │
//! │  │   transform ──► lookup by MLS number                        │       │
//! │  │       │              │                                      │       │
//! │  │       │        found ├──► update row in place    (updated+1)│       │
//! │  │       │        none  └──► insert row + children  (added+1)  │       │
//! │  │       │                                       (processed+1) │       │
//! │  │       ▼                                                     │       │
//! │  │   page full?  yes ──► page += 1, loop                       │       │
//! │  └───────│─────────────────────────────────────────────────────┘       │
//! │          no (short page)                                               │
//! │          ▼                                                             │
//! │  finalize log (success + counters) ──► return SyncReport               │
//! │                                                                         │
//! │  ANY feed/store error: finalize log (error + message + counters        │
//! │  so far), propagate. Rows committed before the failure STAY            │
//! │  committed - there is no run-level rollback.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`reconciler`] - The `Reconciler` and its page/upsert loop
//! - [`feed`] - `FeedClient` trait, HTTP implementation, in-memory stub
//! - [`store`] - `ListingStore` repository seam over vista-db
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types
//!
//! ## Concurrency Model
//!
//! Strictly sequential within a run: one page at a time, one listing at a
//! time. Nothing serializes two overlapping runs against each other; callers
//! must not invoke the reconciler concurrently (a race between lookup and
//! insert for the same MLS number would surface as a UNIQUE violation).

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod feed;
pub mod reconciler;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{FeedConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use feed::{FeedClient, FeedPage, FeedQuery, HttpFeedClient, StaticFeed};
pub use reconciler::{Reconciler, SyncOptions};
pub use store::{ListingStore, SqliteListingStore};
