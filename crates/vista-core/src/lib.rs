//! # vista-core: Pure Domain Logic for Vista
//!
//! This crate is the **heart** of the Vista listing pipeline. It contains the
//! canonical domain types and the vendor-listing transform as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Vista Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    MLS Vendor Feed (HTTP)                       │   │
//! │  │      loosely-typed JSON: ListPrice, BedroomsTotal, Media...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vista-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────────┐  ┌───────────────────────┐  │   │
//! │  │   │   types   │  │    listing    │  │        error          │  │   │
//! │  │   │ Property  │  │ VendorListing │  │      CoreError        │  │   │
//! │  │   │ SyncLog   │  │  transform()  │  │                       │  │   │
//! │  │   └───────────┘  └───────────────┘  └───────────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vista-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Property, PropertyImage, SyncLogEntry, etc.)
//! - [`listing`] - Vendor listing wrapper and the canonical transform
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: The transform is deterministic given its input
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Total Transform**: a vendor listing ALWAYS maps to a structurally
//!    valid [`Property`], degrading missing fields to documented defaults
//! 4. **Explicit Aliases**: vendor field precedence is an auditable constant,
//!    never an ad hoc fallback chain

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod listing;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::CoreError;
pub use listing::{transform, FeatureInput, ImageInput, TransformedListing, VendorListing};
pub use types::{
    Property, PropertyFeature, PropertyImage, PropertyStatus, SyncLogEntry, SyncLogStatus,
    SyncReport,
};

/// Sync type recorded in the sync log for MLS listing runs.
pub const SYNC_TYPE_LISTINGS: &str = "mls_listings";
