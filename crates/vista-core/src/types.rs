//! # Domain Types
//!
//! Canonical types stored and served by Vista.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Property     │   │ PropertyImage   │   │ PropertyFeature │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │ 1─n  id (UUID)     │ 1─n  id (UUID)      │       │
//! │  │  mls_number (!) │   │  url            │   │  name           │       │
//! │  │  price          │   │  display_order  │   │  category       │       │
//! │  │  status         │   │  is_primary     │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  SyncLogEntry   │   │ PropertyStatus  │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  one per run    │   │  Active ...     │                             │
//! │  │  counters       │   │  ComingSoon     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A property has:
//! - `id`: UUID v4 - immutable surrogate, used for database relations
//! - `mls_number`: vendor-supplied natural key, UNIQUE across all rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// =============================================================================
// Property Status
// =============================================================================

/// Lifecycle status of a listing.
///
/// Vendor feeds carry free-form status strings (`StandardStatus`); the
/// transform normalizes them onto this closed set, defaulting to `Active`
/// for anything unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
pub enum PropertyStatus {
    /// On market, accepting offers.
    #[default]
    Active,
    /// Under contract, sale not yet closed.
    Pending,
    /// Sale closed.
    Sold,
    /// Pulled from the market by the seller.
    Withdrawn,
    /// Listing agreement ran out.
    Expired,
    /// Listing agreement terminated.
    Cancelled,
    /// Announced but not yet showable.
    ComingSoon,
}

impl PropertyStatus {
    /// Returns the canonical storage string (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Active => "active",
            PropertyStatus::Pending => "pending",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Withdrawn => "withdrawn",
            PropertyStatus::Expired => "expired",
            PropertyStatus::Cancelled => "cancelled",
            PropertyStatus::ComingSoon => "coming_soon",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PropertyStatus::Active),
            "pending" => Ok(PropertyStatus::Pending),
            "sold" => Ok(PropertyStatus::Sold),
            "withdrawn" => Ok(PropertyStatus::Withdrawn),
            "expired" => Ok(PropertyStatus::Expired),
            "cancelled" => Ok(PropertyStatus::Cancelled),
            "coming_soon" => Ok(PropertyStatus::ComingSoon),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

// =============================================================================
// Property
// =============================================================================

/// A property listing in canonical form.
///
/// Numeric fields default to `0` when the vendor feed omits them; the
/// transform guarantees every field is populated (see [`crate::listing`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Property {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Vendor-supplied MLS number - the natural key.
    /// UNIQUE at the schema level; reconciliation must never duplicate it.
    pub mls_number: String,

    /// Listing price in dollars.
    pub price: f64,

    /// Street address line.
    pub street_address: String,

    /// City name.
    pub city: String,

    /// State or province code.
    pub state: String,

    /// Postal code.
    pub zip_code: String,

    /// Geographic latitude.
    pub latitude: f64,

    /// Geographic longitude.
    pub longitude: f64,

    /// Bedroom count.
    pub bedrooms: i64,

    /// Bathroom count (half baths give fractional values, e.g. 2.5).
    pub bathrooms: f64,

    /// Interior living area in square feet.
    pub square_feet: i64,

    /// Lot size in acres.
    pub lot_size: f64,

    /// Vendor property type (e.g. "Residential", "Condominium").
    pub property_type: String,

    /// Lifecycle status.
    pub status: PropertyStatus,

    /// Year of construction.
    pub year_built: i64,

    /// Annual tax amount in dollars.
    pub tax_amount: f64,

    /// Monthly HOA fee in dollars.
    pub hoa_fee: f64,

    /// Public remarks / marketing description.
    pub description: Option<String>,

    /// When the listing went on market (vendor timestamp).
    pub listed_at: Option<DateTime<Utc>>,

    /// Vendor-side last modification timestamp.
    pub vendor_updated_at: Option<DateTime<Utc>>,

    /// When this row was first created locally.
    pub created_at: DateTime<Utc>,

    /// When this row was last written locally.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Property Children
// =============================================================================

/// A photo attached to a property.
///
/// Written only at property-insert time; the image at `display_order` 0 is
/// flagged primary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PropertyImage {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning property.
    pub property_id: String,

    /// Image URL.
    pub url: String,

    /// Display position, zero-based.
    pub display_order: i64,

    /// Whether this is the hero image (display_order 0).
    pub is_primary: bool,
}

/// A feature tag attached to a property (e.g. "Hardwood Floors").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PropertyFeature {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning property.
    pub property_id: String,

    /// Feature name.
    pub name: String,

    /// Feature grouping ("interior", "exterior", "appliance").
    pub category: Option<String>,
}

// =============================================================================
// Sync Log
// =============================================================================

/// Run state of a sync-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
pub enum SyncLogStatus {
    /// Run opened, not yet finalized.
    InProgress,
    /// Run completed without error.
    Success,
    /// Run aborted; `error_message` holds the cause.
    Error,
}

impl SyncLogStatus {
    /// Returns the canonical storage string (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncLogStatus::InProgress => "in_progress",
            SyncLogStatus::Success => "success",
            SyncLogStatus::Error => "error",
        }
    }
}

impl FromStr for SyncLogStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SyncLogStatus::InProgress),
            "success" => Ok(SyncLogStatus::Success),
            "error" => Ok(SyncLogStatus::Error),
            other => Err(CoreError::UnknownSyncStatus(other.to_string())),
        }
    }
}

/// One row per reconciliation run, used purely for observability.
///
/// ## Lifecycle
/// ```text
/// run start ──► INSERT (status = in_progress, counters = 0)
///      │
///      ├── loop completes ──► UPDATE (status = success, final counters)
///      │
///      └── loop aborts ─────► UPDATE (status = error, message, counters
///                                     accumulated so far)
/// ```
/// Finalized exactly once per run, on whichever path terminates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SyncLogEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// What was synced (e.g. "mls_listings").
    pub sync_type: String,

    /// Run state.
    pub status: SyncLogStatus,

    /// Listings examined, regardless of branch taken.
    pub records_processed: i64,

    /// Listings inserted as new properties.
    pub records_added: i64,

    /// Listings that updated an existing property.
    pub records_updated: i64,

    /// Reserved: the reconciler never deletes, so this stays 0.
    pub records_deleted: i64,

    /// Failure cause when status is `error`.
    pub error_message: Option<String>,

    /// When the run was opened.
    pub started_at: DateTime<Utc>,

    /// When the run was finalized (either path).
    pub completed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Sync Report
// =============================================================================

/// Aggregate counters returned by a reconciliation run.
///
/// Serialized camelCase because the trigger endpoint exposes these fields
/// verbatim in its JSON response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Listings examined.
    pub records_processed: i64,

    /// New property rows inserted.
    pub records_added: i64,

    /// Existing property rows updated in place.
    pub records_updated: i64,

    /// Always 0 - deletion is tracked but unimplemented.
    pub records_deleted: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
