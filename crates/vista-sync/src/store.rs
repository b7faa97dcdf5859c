//! # Listing Store
//!
//! Repository seam between the reconciler and the database layer.
//!
//! The reconciler talks to this trait, not to vista-db directly, so its
//! behavior (pagination, counters, log lifecycle) can be tested with a
//! wrapped or failing store, and so the storage calling convention stays
//! out of the loop logic.

use async_trait::async_trait;

use crate::error::SyncResult;
use vista_core::listing::{FeatureInput, ImageInput};
use vista_core::Property;
use vista_db::Database;

// =============================================================================
// Listing Store Trait
// =============================================================================

/// Typed data-access interface for the reconciler.
///
/// One method per store operation the sync loop performs; every call is an
/// independent suspension point and every error aborts the run.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Looks up an existing property by its vendor MLS number.
    async fn find_property_by_mls_number(&self, mls_number: &str)
        -> SyncResult<Option<Property>>;

    /// Inserts a new property row.
    async fn insert_property(&self, property: &Property) -> SyncResult<()>;

    /// Updates an existing property row in place (matched by MLS number).
    async fn update_property(&self, property: &Property) -> SyncResult<()>;

    /// Inserts image child rows for a freshly inserted property.
    async fn insert_images(&self, property_id: &str, images: &[ImageInput]) -> SyncResult<()>;

    /// Inserts feature child rows for a freshly inserted property.
    async fn insert_features(
        &self,
        property_id: &str,
        features: &[FeatureInput],
    ) -> SyncResult<()>;
}

// =============================================================================
// SQLite Implementation
// =============================================================================

/// Production store backed by the vista-db repositories.
#[derive(Debug, Clone)]
pub struct SqliteListingStore {
    db: Database,
}

impl SqliteListingStore {
    /// Wraps a database handle.
    pub fn new(db: Database) -> Self {
        SqliteListingStore { db }
    }
}

#[async_trait]
impl ListingStore for SqliteListingStore {
    async fn find_property_by_mls_number(
        &self,
        mls_number: &str,
    ) -> SyncResult<Option<Property>> {
        Ok(self.db.properties().find_by_mls_number(mls_number).await?)
    }

    async fn insert_property(&self, property: &Property) -> SyncResult<()> {
        Ok(self.db.properties().insert(property).await?)
    }

    async fn update_property(&self, property: &Property) -> SyncResult<()> {
        Ok(self.db.properties().update(property).await?)
    }

    async fn insert_images(&self, property_id: &str, images: &[ImageInput]) -> SyncResult<()> {
        Ok(self.db.properties().insert_images(property_id, images).await?)
    }

    async fn insert_features(
        &self,
        property_id: &str,
        features: &[FeatureInput],
    ) -> SyncResult<()> {
        Ok(self
            .db
            .properties()
            .insert_features(property_id, features)
            .await?)
    }
}
