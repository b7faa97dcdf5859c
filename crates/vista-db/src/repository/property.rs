//! # Property Repository
//!
//! Database operations for canonical property listings.
//!
//! ## Key Operations
//! - Natural-key lookup by MLS number (the reconciler's hot path)
//! - Insert / in-place update of property rows
//! - Transactional child-row inserts (images, features)
//!
//! ## Upsert Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How the reconciler uses this repository                    │
//! │                                                                         │
//! │  listing arrives ──► find_by_mls_number("MLS-123")                      │
//! │       │                                                                 │
//! │       ├── Some(row) ──► update(property)        (children untouched)    │
//! │       │                                                                 │
//! │       └── None ──────► insert(property)                                 │
//! │                        insert_images(id, ...)   ┐ one transaction       │
//! │                        insert_features(id, ...) ┘ each                  │
//! │                                                                         │
//! │  The UNIQUE index on mls_number backstops the lookup: a racing          │
//! │  duplicate insert fails loudly instead of duplicating the row.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vista_core::listing::{FeatureInput, ImageInput};
use vista_core::{Property, PropertyFeature, PropertyImage};

/// Repository for property database operations.
#[derive(Debug, Clone)]
pub struct PropertyRepository {
    pool: SqlitePool,
}

impl PropertyRepository {
    /// Creates a new PropertyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PropertyRepository { pool }
    }

    /// Looks a property up by its vendor MLS number.
    ///
    /// ## Returns
    /// * `Ok(Some(Property))` - Property found
    /// * `Ok(None)` - No row for this MLS number yet
    pub async fn find_by_mls_number(&self, mls_number: &str) -> DbResult<Option<Property>> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            SELECT
                id, mls_number, price, street_address, city, state, zip_code,
                latitude, longitude, bedrooms, bathrooms, square_feet, lot_size,
                property_type, status, year_built, tax_amount, hoa_fee,
                description, listed_at, vendor_updated_at, created_at, updated_at
            FROM properties
            WHERE mls_number = ?1
            "#,
        )
        .bind(mls_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    /// Inserts a new property row.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - MLS number already exists
    pub async fn insert(&self, property: &Property) -> DbResult<()> {
        debug!(mls_number = %property.mls_number, "Inserting property");

        sqlx::query(
            r#"
            INSERT INTO properties (
                id, mls_number, price, street_address, city, state, zip_code,
                latitude, longitude, bedrooms, bathrooms, square_feet, lot_size,
                property_type, status, year_built, tax_amount, hoa_fee,
                description, listed_at, vendor_updated_at, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18,
                ?19, ?20, ?21, ?22, ?23
            )
            "#,
        )
        .bind(&property.id)
        .bind(&property.mls_number)
        .bind(property.price)
        .bind(&property.street_address)
        .bind(&property.city)
        .bind(&property.state)
        .bind(&property.zip_code)
        .bind(property.latitude)
        .bind(property.longitude)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.square_feet)
        .bind(property.lot_size)
        .bind(&property.property_type)
        .bind(property.status)
        .bind(property.year_built)
        .bind(property.tax_amount)
        .bind(property.hoa_fee)
        .bind(&property.description)
        .bind(property.listed_at)
        .bind(property.vendor_updated_at)
        .bind(property.created_at)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates all mutable fields of the row with this MLS number in place.
    ///
    /// The surrogate id and created_at are preserved; updated_at is bumped.
    /// Child image/feature rows are NOT touched here.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - No row for this MLS number
    pub async fn update(&self, property: &Property) -> DbResult<()> {
        debug!(mls_number = %property.mls_number, "Updating property");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE properties SET
                price = ?2,
                street_address = ?3,
                city = ?4,
                state = ?5,
                zip_code = ?6,
                latitude = ?7,
                longitude = ?8,
                bedrooms = ?9,
                bathrooms = ?10,
                square_feet = ?11,
                lot_size = ?12,
                property_type = ?13,
                status = ?14,
                year_built = ?15,
                tax_amount = ?16,
                hoa_fee = ?17,
                description = ?18,
                listed_at = ?19,
                vendor_updated_at = ?20,
                updated_at = ?21
            WHERE mls_number = ?1
            "#,
        )
        .bind(&property.mls_number)
        .bind(property.price)
        .bind(&property.street_address)
        .bind(&property.city)
        .bind(&property.state)
        .bind(&property.zip_code)
        .bind(property.latitude)
        .bind(property.longitude)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.square_feet)
        .bind(property.lot_size)
        .bind(&property.property_type)
        .bind(property.status)
        .bind(property.year_built)
        .bind(property.tax_amount)
        .bind(property.hoa_fee)
        .bind(&property.description)
        .bind(property.listed_at)
        .bind(property.vendor_updated_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Property", &property.mls_number));
        }

        Ok(())
    }

    /// Inserts image child rows for a property, inside one transaction.
    ///
    /// A failure partway rolls back THIS property's images only; nothing
    /// else committed earlier in the sync run is affected.
    pub async fn insert_images(&self, property_id: &str, images: &[ImageInput]) -> DbResult<()> {
        if images.is_empty() {
            return Ok(());
        }

        debug!(property_id = %property_id, count = images.len(), "Inserting property images");

        let mut tx = self.pool.begin().await?;

        for image in images {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO property_images (id, property_id, url, display_order, is_primary)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&id)
            .bind(property_id)
            .bind(&image.url)
            .bind(image.display_order)
            .bind(image.is_primary)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Inserts feature child rows for a property, inside one transaction.
    pub async fn insert_features(
        &self,
        property_id: &str,
        features: &[FeatureInput],
    ) -> DbResult<()> {
        if features.is_empty() {
            return Ok(());
        }

        debug!(property_id = %property_id, count = features.len(), "Inserting property features");

        let mut tx = self.pool.begin().await?;

        for feature in features {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO property_features (id, property_id, name, category)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&id)
            .bind(property_id)
            .bind(&feature.name)
            .bind(&feature.category)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Lists a property's images, display order ascending.
    pub async fn images(&self, property_id: &str) -> DbResult<Vec<PropertyImage>> {
        let images = sqlx::query_as::<_, PropertyImage>(
            r#"
            SELECT id, property_id, url, display_order, is_primary
            FROM property_images
            WHERE property_id = ?1
            ORDER BY display_order ASC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// Lists a property's feature tags.
    pub async fn features(&self, property_id: &str) -> DbResult<Vec<PropertyFeature>> {
        let features = sqlx::query_as::<_, PropertyFeature>(
            r#"
            SELECT id, property_id, name, category
            FROM property_features
            WHERE property_id = ?1
            ORDER BY name ASC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(features)
    }

    /// Counts total property rows (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vista_core::PropertyStatus;

    fn sample_property(mls: &str) -> Property {
        let now = Utc::now();
        Property {
            id: Uuid::new_v4().to_string(),
            mls_number: mls.to_string(),
            price: 450_000.0,
            street_address: "12 Elm St".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip_code: "78701".to_string(),
            latitude: 30.26,
            longitude: -97.74,
            bedrooms: 3,
            bathrooms: 2.5,
            square_feet: 1850,
            lot_size: 0.2,
            property_type: "Residential".to_string(),
            status: PropertyStatus::Active,
            year_built: 1998,
            tax_amount: 8_200.0,
            hoa_fee: 0.0,
            description: Some("Charming bungalow".to_string()),
            listed_at: None,
            vendor_updated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_by_mls_number() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.properties();

        let property = sample_property("MLS-100");
        repo.insert(&property).await.unwrap();

        let found = repo.find_by_mls_number("MLS-100").await.unwrap().unwrap();
        assert_eq!(found.id, property.id);
        assert_eq!(found.price, 450_000.0);
        assert_eq!(found.status, PropertyStatus::Active);

        assert!(repo.find_by_mls_number("MLS-999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_mls_number_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.properties();

        repo.insert(&sample_property("MLS-100")).await.unwrap();
        let err = repo.insert(&sample_property("MLS-100")).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_mutates_in_place() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.properties();

        let original = sample_property("MLS-100");
        repo.insert(&original).await.unwrap();

        let mut revised = sample_property("MLS-100");
        revised.price = 425_000.0;
        revised.status = PropertyStatus::Pending;
        repo.update(&revised).await.unwrap();

        let found = repo.find_by_mls_number("MLS-100").await.unwrap().unwrap();
        // surrogate id survives the update, fields reflect the revision
        assert_eq!(found.id, original.id);
        assert_eq!(found.price, 425_000.0);
        assert_eq!(found.status, PropertyStatus::Pending);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.properties();

        let err = repo.update(&sample_property("MLS-404")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_child_rows_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.properties();

        let property = sample_property("MLS-100");
        repo.insert(&property).await.unwrap();

        let images = vec![
            ImageInput {
                url: "https://img.example.com/a.jpg".to_string(),
                display_order: 0,
                is_primary: true,
            },
            ImageInput {
                url: "https://img.example.com/b.jpg".to_string(),
                display_order: 1,
                is_primary: false,
            },
        ];
        let features = vec![FeatureInput {
            name: "Fireplace".to_string(),
            category: "interior".to_string(),
        }];

        repo.insert_images(&property.id, &images).await.unwrap();
        repo.insert_features(&property.id, &features).await.unwrap();

        let stored_images = repo.images(&property.id).await.unwrap();
        assert_eq!(stored_images.len(), 2);
        assert!(stored_images[0].is_primary);
        assert_eq!(stored_images[0].display_order, 0);
        assert!(!stored_images[1].is_primary);

        let stored_features = repo.features(&property.id).await.unwrap();
        assert_eq!(stored_features.len(), 1);
        assert_eq!(stored_features[0].name, "Fireplace");
        assert_eq!(stored_features[0].category.as_deref(), Some("interior"));
    }

    #[tokio::test]
    async fn test_child_insert_requires_existing_property() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.properties();

        let images = vec![ImageInput {
            url: "https://img.example.com/a.jpg".to_string(),
            display_order: 0,
            is_primary: true,
        }];

        // FK enforcement: orphan children must be rejected and rolled back
        let err = repo.insert_images("no-such-property", &images).await;
        assert!(err.is_err());
    }
}
