//! # Repository Implementations
//!
//! One repository per aggregate, each a thin typed wrapper over the shared
//! `SqlitePool`:
//!
//! - [`property`] - canonical listings plus their image/feature children
//! - [`sync_log`] - reconciliation run bookkeeping
//!
//! Repositories are cheap to construct (pool clone) and are handed out by
//! [`crate::Database`] accessor methods.

pub mod property;
pub mod sync_log;
