//! # Vendor Listing Transform
//!
//! Wraps the loosely-typed JSON records delivered by the MLS vendor feed and
//! maps them onto the canonical [`Property`] shape.
//!
//! ## Mapping Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Field Mapping Policy                               │
//! │                                                                         │
//! │  Vendor record (no fixed schema guaranteed):                           │
//! │    { "ListPrice": 450000, "BedroomsTotal": "3", "StandardStatus": ... }│
//! │                                                                         │
//! │  Per canonical field, an ORDERED alias list:                           │
//! │    price      ← ListPrice, else price,      else 0                     │
//! │    mls_number ← ListingId,  else ListingKey, else mlsNumber, else ""   │
//! │    status     ← StandardStatus → mapping table, default active         │
//! │                                                                         │
//! │  Rules:                                                                 │
//! │  • First non-null, non-empty alias wins                                │
//! │  • Numbers accept JSON numbers AND numeric strings ("$450,000" ok)     │
//! │  • Anything unparseable degrades to the default - NEVER an error       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transform is total: every vendor record produces a structurally valid
//! (if zero-valued) property. Data quality problems are a store/display
//! concern, not a sync-abort concern.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::{Property, PropertyStatus};

// =============================================================================
// Field Aliases
// =============================================================================

/// Ordered vendor field aliases per canonical attribute.
///
/// Kept as named constants so the precedence is auditable and testable in
/// isolation. First match wins.
pub mod fields {
    pub const MLS_NUMBER: &[&str] = &["ListingId", "ListingKey", "mlsNumber", "mls_number"];
    pub const PRICE: &[&str] = &["ListPrice", "price"];
    pub const STREET_ADDRESS: &[&str] = &["UnparsedAddress", "StreetAddress", "address"];
    pub const CITY: &[&str] = &["City", "city"];
    pub const STATE: &[&str] = &["StateOrProvince", "state"];
    pub const ZIP_CODE: &[&str] = &["PostalCode", "zipCode", "zip"];
    pub const LATITUDE: &[&str] = &["Latitude", "latitude", "lat"];
    pub const LONGITUDE: &[&str] = &["Longitude", "longitude", "lng"];
    pub const BEDROOMS: &[&str] = &["BedroomsTotal", "bedrooms", "beds"];
    pub const BATHROOMS: &[&str] = &["BathroomsTotalDecimal", "BathroomsTotalInteger", "bathrooms", "baths"];
    pub const SQUARE_FEET: &[&str] = &["LivingArea", "BuildingAreaTotal", "squareFeet", "sqft"];
    pub const LOT_SIZE: &[&str] = &["LotSizeAcres", "lotSize"];
    pub const PROPERTY_TYPE: &[&str] = &["PropertySubType", "PropertyType", "propertyType"];
    pub const STATUS: &[&str] = &["StandardStatus", "MlsStatus", "status"];
    pub const YEAR_BUILT: &[&str] = &["YearBuilt", "yearBuilt"];
    pub const TAX_AMOUNT: &[&str] = &["TaxAnnualAmount", "taxAmount"];
    pub const HOA_FEE: &[&str] = &["AssociationFee", "hoaFee"];
    pub const DESCRIPTION: &[&str] = &["PublicRemarks", "description"];
    pub const LISTED_AT: &[&str] = &["ListingContractDate", "OnMarketDate", "listedAt"];
    pub const VENDOR_UPDATED_AT: &[&str] = &["ModificationTimestamp", "updatedAt"];
    pub const MEDIA: &[&str] = &["Media", "media", "photos", "images"];
}

// =============================================================================
// Vendor Listing
// =============================================================================

/// A single record from the vendor feed.
///
/// No schema is guaranteed, so this is a thin wrapper over the raw JSON
/// object with alias-aware accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorListing(Map<String, Value>);

impl VendorListing {
    /// Wraps a raw JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        VendorListing(fields)
    }

    /// Wraps an arbitrary JSON value; non-objects become the empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => VendorListing(map),
            _ => VendorListing(Map::new()),
        }
    }

    /// Returns the first alias whose value is present and non-empty.
    fn raw(&self, aliases: &[&str]) -> Option<&Value> {
        for key in aliases {
            match self.0.get(*key) {
                None | Some(Value::Null) => continue,
                Some(Value::String(s)) if s.trim().is_empty() => continue,
                Some(value) => return Some(value),
            }
        }
        None
    }

    /// Text value for the first matching alias.
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        match self.raw(aliases)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Text value, or the empty string when every alias is missing.
    pub fn text_or_empty(&self, aliases: &[&str]) -> String {
        self.text(aliases).unwrap_or_default()
    }

    /// Numeric value for the first matching alias, defaulting to `0.0`.
    ///
    /// Accepts JSON numbers and numeric strings; "$450,000" parses as
    /// 450000.0. Unparseable input degrades to the default.
    pub fn number(&self, aliases: &[&str]) -> f64 {
        match self.raw(aliases) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => parse_loose_number(s).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Integer value for the first matching alias, defaulting to `0`.
    pub fn integer(&self, aliases: &[&str]) -> i64 {
        self.number(aliases) as i64
    }

    /// Timestamp value for the first matching alias.
    ///
    /// Accepts RFC 3339 datetimes and bare `YYYY-MM-DD` dates (treated as
    /// midnight UTC). Anything else is `None`.
    pub fn timestamp(&self, aliases: &[&str]) -> Option<DateTime<Utc>> {
        let text = self.text(aliases)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
            return Some(dt.with_timezone(&Utc));
        }
        let date = NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok()?;
        Some(DateTime::from_naive_utc_and_offset(
            date.and_hms_opt(0, 0, 0)?,
            Utc,
        ))
    }
}

/// Parses a number out of a vendor string, tolerating currency formatting.
fn parse_loose_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    cleaned.parse::<f64>().ok()
}

// =============================================================================
// Status Mapping
// =============================================================================

/// Maps a vendor status string onto the canonical lifecycle status.
///
/// Fixed table, case-insensitive; anything unrecognized is `Active` so a
/// vendor introducing a new status can never break a sync run.
pub fn map_vendor_status(raw: &str) -> PropertyStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "active" => PropertyStatus::Active,
        "pending" | "active under contract" => PropertyStatus::Pending,
        "closed" | "sold" => PropertyStatus::Sold,
        "withdrawn" => PropertyStatus::Withdrawn,
        "expired" => PropertyStatus::Expired,
        "canceled" | "cancelled" => PropertyStatus::Cancelled,
        "coming soon" | "coming_soon" => PropertyStatus::ComingSoon,
        _ => PropertyStatus::Active,
    }
}

// =============================================================================
// Transform Output
// =============================================================================

/// Image extracted from a vendor listing, before it is given an id and owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInput {
    /// Image URL.
    pub url: String,
    /// Display position, zero-based (feed delivery order).
    pub display_order: i64,
    /// True for the first image only.
    pub is_primary: bool,
}

/// Feature extracted from a vendor listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureInput {
    /// Feature name, e.g. "Hardwood Floors".
    pub name: String,
    /// Grouping: "interior", "exterior" or "appliance".
    pub category: String,
}

/// The canonical result of transforming one vendor record.
#[derive(Debug, Clone)]
pub struct TransformedListing {
    /// Canonical property row (freshly generated id + local timestamps).
    pub property: Property,
    /// Child images, written only on first insert.
    pub images: Vec<ImageInput>,
    /// Child features, written only on first insert.
    pub features: Vec<FeatureInput>,
}

// =============================================================================
// Transform
// =============================================================================

/// Transforms one vendor record into the canonical shape.
///
/// Total function: never fails. Missing or malformed vendor fields degrade
/// to empty strings / zeroes per the alias tables in [`fields`].
pub fn transform(listing: &VendorListing) -> TransformedListing {
    let now = Utc::now();

    let status = listing
        .text(fields::STATUS)
        .map(|raw| map_vendor_status(&raw))
        .unwrap_or_default();

    let property = Property {
        id: Uuid::new_v4().to_string(),
        mls_number: listing.text_or_empty(fields::MLS_NUMBER),
        price: listing.number(fields::PRICE),
        street_address: listing.text_or_empty(fields::STREET_ADDRESS),
        city: listing.text_or_empty(fields::CITY),
        state: listing.text_or_empty(fields::STATE),
        zip_code: listing.text_or_empty(fields::ZIP_CODE),
        latitude: listing.number(fields::LATITUDE),
        longitude: listing.number(fields::LONGITUDE),
        bedrooms: listing.integer(fields::BEDROOMS),
        bathrooms: listing.number(fields::BATHROOMS),
        square_feet: listing.integer(fields::SQUARE_FEET),
        lot_size: listing.number(fields::LOT_SIZE),
        property_type: listing.text_or_empty(fields::PROPERTY_TYPE),
        status,
        year_built: listing.integer(fields::YEAR_BUILT),
        tax_amount: listing.number(fields::TAX_AMOUNT),
        hoa_fee: listing.number(fields::HOA_FEE),
        description: listing.text(fields::DESCRIPTION),
        listed_at: listing.timestamp(fields::LISTED_AT),
        vendor_updated_at: listing.timestamp(fields::VENDOR_UPDATED_AT),
        created_at: now,
        updated_at: now,
    };

    TransformedListing {
        property,
        images: extract_images(listing),
        features: extract_features(listing),
    }
}

/// Pulls image URLs out of a vendor record.
///
/// RESO-style feeds deliver `Media` as an array of objects carrying
/// `MediaURL`; simpler feeds deliver `photos`/`images` as URL strings.
/// Delivery order is display order; index 0 is the primary image.
fn extract_images(listing: &VendorListing) -> Vec<ImageInput> {
    let Some(Value::Array(items)) = listing.raw(fields::MEDIA) else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for item in items {
        let url = match item {
            Value::String(s) => s.trim().to_string(),
            Value::Object(obj) => ["MediaURL", "MediaUrl", "url"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_str))
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };
        if url.is_empty() {
            continue;
        }
        let display_order = images.len() as i64;
        images.push(ImageInput {
            url,
            display_order,
            is_primary: display_order == 0,
        });
    }
    images
}

/// Pulls categorized feature tags out of a vendor record.
///
/// Each source field may be a JSON array of strings or a single
/// comma-separated string; both forms show up in practice.
fn extract_features(listing: &VendorListing) -> Vec<FeatureInput> {
    const SOURCES: &[(&[&str], &str)] = &[
        (&["InteriorFeatures", "interiorFeatures"], "interior"),
        (&["ExteriorFeatures", "exteriorFeatures"], "exterior"),
        (&["Appliances", "appliances"], "appliance"),
    ];

    let mut features = Vec::new();
    for (aliases, category) in SOURCES {
        let names: Vec<String> = match listing.raw(aliases) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .collect(),
            Some(Value::String(s)) => s.split(',').map(|part| part.trim().to_string()).collect(),
            _ => Vec::new(),
        };
        for name in names {
            if !name.is_empty() {
                features.push(FeatureInput {
                    name,
                    category: (*category).to_string(),
                });
            }
        }
    }
    features
}

// =============================================================================
// Unit Tests
// =============================================================================
