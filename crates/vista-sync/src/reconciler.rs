//! # Listing Reconciler
//!
//! Pulls pages of vendor listings and reconciles each against the local
//! property store: insert on first sight of an MLS number, in-place update
//! on every later sight. One sync log entry brackets the whole run.
//!
//! ## Loop Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  page = 1                                                               │
//! │  loop {                                                                 │
//! │      page_of_listings = feed.fetch_listings(page, limit, status)        │
//! │      for listing in page_of_listings {        // strictly sequential    │
//! │          processed += 1                                                 │
//! │          transform ─► lookup by MLS number                              │
//! │              found ──► update row            updated += 1               │
//! │              none ───► insert row + children added += 1                 │
//! │      }                                                                  │
//! │      if page_of_listings.len() < limit { break }  // short page = done  │
//! │      page += 1                                                          │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! - The transform never fails (see vista-core).
//! - Feed and store errors abort the run: the sync log entry is finalized
//!   with status `error`, the message, and the counters accumulated so far,
//!   then the error propagates to the caller.
//! - Rows committed before the failure stay committed. There is NO run-level
//!   rollback; partial-run residue is an accepted property of this design.
//! - No cross-run guard exists. Two overlapping runs can race between lookup
//!   and insert for the same MLS number; the UNIQUE index turns that race
//!   into a loud failure rather than a duplicate row.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::SyncDefaults;
use crate::error::SyncResult;
use crate::feed::{FeedClient, FeedQuery};
use crate::store::ListingStore;
use vista_core::{transform, SyncReport, VendorListing, SYNC_TYPE_LISTINGS};
use vista_db::SyncLogRepository;

// =============================================================================
// Sync Options
// =============================================================================

/// Per-invocation overrides for a sync run.
///
/// Deserializable so the HTTP trigger can pass its JSON body straight
/// through. A `limit` of 0 is treated as "not set" and falls back to the
/// configured page size (a zero limit would make every page a full page and
/// the loop would never terminate).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Feed page size for this run.
    #[serde(default)]
    pub limit: Option<u32>,

    /// Vendor status filter for this run (e.g. "Active").
    #[serde(default)]
    pub status: Option<String>,
}

// =============================================================================
// Reconciler
// =============================================================================

/// Orchestrates one reconciliation run at a time.
///
/// Holds the feed and store behind their trait seams plus the sync log
/// repository for run bookkeeping. Sequential by construction: no parallel
/// page fetches, no parallel row operations.
pub struct Reconciler {
    feed: Arc<dyn FeedClient>,
    store: Arc<dyn ListingStore>,
    sync_logs: SyncLogRepository,
    defaults: SyncDefaults,
}

impl Reconciler {
    /// Creates a reconciler over the given feed, store and sync log.
    pub fn new(
        feed: Arc<dyn FeedClient>,
        store: Arc<dyn ListingStore>,
        sync_logs: SyncLogRepository,
        defaults: SyncDefaults,
    ) -> Self {
        Reconciler {
            feed,
            store,
            sync_logs,
            defaults,
        }
    }

    /// Runs one full reconciliation and returns the aggregate counters.
    ///
    /// ## Behavior
    /// 1. Open a sync log entry (`in_progress`), retaining its id
    /// 2. Page through the feed, upserting each listing (see module docs)
    /// 3. Finalize the entry `success` with the final counters, or `error`
    ///    with the message and the counters accumulated so far
    ///
    /// Errors propagate to the caller either way; the log entry is finalized
    /// exactly once on every path.
    pub async fn sync_listings(&self, options: SyncOptions) -> SyncResult<SyncReport> {
        let limit = options
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(self.defaults.page_size);
        let status = options
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.defaults.status.clone());

        let entry = self.sync_logs.start(SYNC_TYPE_LISTINGS).await?;
        info!(limit, status = %status, log_id = %entry.id, "Starting listing sync");

        let mut report = SyncReport::default();

        match self.run(limit, &status, &mut report).await {
            Ok(()) => {
                self.sync_logs.finalize_success(&entry.id, &report).await?;
                info!(
                    processed = report.records_processed,
                    added = report.records_added,
                    updated = report.records_updated,
                    "Listing sync complete"
                );
                Ok(report)
            }
            Err(err) => {
                error!(error = %err, processed = report.records_processed, "Listing sync failed");
                // best-effort: the original failure outranks a log-write failure
                if let Err(log_err) = self
                    .sync_logs
                    .finalize_error(&entry.id, &report, &err.to_string())
                    .await
                {
                    error!(error = %log_err, "Failed to finalize sync log entry");
                }
                Err(err)
            }
        }
    }

    /// The pagination + upsert loop. Counters accumulate in `report` so the
    /// caller can record partial progress when this returns an error.
    async fn run(&self, limit: u32, status: &str, report: &mut SyncReport) -> SyncResult<()> {
        let mut page = 1u32;

        loop {
            let feed_page = self
                .feed
                .fetch_listings(&FeedQuery {
                    page,
                    limit,
                    status: status.to_string(),
                })
                .await?;

            let count = feed_page.listings.len();
            debug!(page, count, "Processing feed page");

            for listing in &feed_page.listings {
                self.apply_listing(listing, report).await?;
            }

            // a full page implies more may exist; a short page ends the run
            if (count as u32) < limit {
                break;
            }
            page += 1;
        }

        Ok(())
    }

    /// Upserts a single vendor listing.
    ///
    /// `records_processed` counts every listing examined, including one whose
    /// store operation subsequently fails - the sync log reflects how far the
    /// run got, not how much of it succeeded.
    async fn apply_listing(
        &self,
        listing: &VendorListing,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        let transformed = transform(listing);
        let mls_number = transformed.property.mls_number.clone();
        report.records_processed += 1;

        match self.store.find_property_by_mls_number(&mls_number).await? {
            Some(_) => {
                self.store.update_property(&transformed.property).await?;
                debug!(mls_number = %mls_number, "Updated existing property");
                report.records_updated += 1;
            }
            None => {
                self.store.insert_property(&transformed.property).await?;
                self.store
                    .insert_images(&transformed.property.id, &transformed.images)
                    .await?;
                self.store
                    .insert_features(&transformed.property.id, &transformed.features)
                    .await?;
                debug!(
                    mls_number = %mls_number,
                    images = transformed.images.len(),
                    features = transformed.features.len(),
                    "Inserted new property"
                );
                report.records_added += 1;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::SyncError;
    use crate::feed::StaticFeed;
    use crate::store::SqliteListingStore;
    use vista_core::listing::{FeatureInput, ImageInput};
    use vista_core::{Property, SyncLogStatus};
    use vista_db::{Database, DbConfig, DbError};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn vendor(mls: &str, price: f64) -> VendorListing {
        VendorListing::from_value(json!({
            "ListingId": mls,
            "ListPrice": price,
            "StandardStatus": "Active",
            "City": "Austin",
        }))
    }

    fn reconciler_for(db: &Database, feed: Arc<StaticFeed>) -> Reconciler {
        Reconciler::new(
            feed,
            Arc::new(SqliteListingStore::new(db.clone())),
            db.sync_logs(),
            SyncDefaults::default(),
        )
    }

    /// Store wrapper that fails `insert_property` for one chosen MLS number.
    struct FailingStore {
        inner: SqliteListingStore,
        fail_on_mls: String,
    }

    #[async_trait]
    impl ListingStore for FailingStore {
        async fn find_property_by_mls_number(
            &self,
            mls_number: &str,
        ) -> SyncResult<Option<Property>> {
            self.inner.find_property_by_mls_number(mls_number).await
        }

        async fn insert_property(&self, property: &Property) -> SyncResult<()> {
            if property.mls_number == self.fail_on_mls {
                return Err(SyncError::Database(DbError::QueryFailed(
                    "disk I/O error".to_string(),
                )));
            }
            self.inner.insert_property(property).await
        }

        async fn update_property(&self, property: &Property) -> SyncResult<()> {
            self.inner.update_property(property).await
        }

        async fn insert_images(
            &self,
            property_id: &str,
            images: &[ImageInput],
        ) -> SyncResult<()> {
            self.inner.insert_images(property_id, images).await
        }

        async fn insert_features(
            &self,
            property_id: &str,
            features: &[FeatureInput],
        ) -> SyncResult<()> {
            self.inner.insert_features(property_id, features).await
        }
    }

    #[tokio::test]
    async fn test_empty_feed_is_a_successful_noop() {
        let db = test_db().await;
        let feed = Arc::new(StaticFeed::empty());
        let reconciler = reconciler_for(&db, feed.clone());

        let report = reconciler.sync_listings(SyncOptions::default()).await.unwrap();

        assert_eq!(report, SyncReport::default());
        assert_eq!(feed.requests(), 1);

        let logs = db.sync_logs().recent(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SyncLogStatus::Success);
        assert_eq!(logs[0].records_processed, 0);
        assert!(logs[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn test_second_sync_updates_instead_of_duplicating() {
        let db = test_db().await;
        let reconciler = reconciler_for(&db, Arc::new(StaticFeed::new(vec![vendor("MLS-1", 500_000.0)])));
        let report = reconciler.sync_listings(SyncOptions::default()).await.unwrap();
        assert_eq!(report.records_added, 1);
        assert_eq!(report.records_updated, 0);

        let original = db
            .properties()
            .find_by_mls_number("MLS-1")
            .await
            .unwrap()
            .unwrap();

        // same MLS number, revised data
        let reconciler = reconciler_for(&db, Arc::new(StaticFeed::new(vec![vendor("MLS-1", 475_000.0)])));
        let report = reconciler.sync_listings(SyncOptions::default()).await.unwrap();
        assert_eq!(report.records_added, 0);
        assert_eq!(report.records_updated, 1);

        assert_eq!(db.properties().count().await.unwrap(), 1);
        let revised = db
            .properties()
            .find_by_mls_number("MLS-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(revised.id, original.id);
        assert_eq!(revised.price, 475_000.0);
    }

    #[tokio::test]
    async fn test_children_written_on_insert_only() {
        let db = test_db().await;
        let with_media = |urls: &[&str]| {
            VendorListing::from_value(json!({
                "ListingId": "MLS-1",
                "Media": urls.iter().map(|u| json!({ "MediaURL": u })).collect::<Vec<_>>(),
            }))
        };

        let reconciler = reconciler_for(
            &db,
            Arc::new(StaticFeed::new(vec![with_media(&["https://a.jpg", "https://b.jpg"])])),
        );
        reconciler.sync_listings(SyncOptions::default()).await.unwrap();

        let property = db
            .properties()
            .find_by_mls_number("MLS-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(db.properties().images(&property.id).await.unwrap().len(), 2);

        // update carries three images, but children are not refreshed
        let reconciler = reconciler_for(
            &db,
            Arc::new(StaticFeed::new(vec![with_media(&[
                "https://a.jpg",
                "https://b.jpg",
                "https://c.jpg",
            ])])),
        );
        reconciler.sync_listings(SyncOptions::default()).await.unwrap();

        assert_eq!(db.properties().images(&property.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_short_page_ends_pagination() {
        let db = test_db().await;
        let listings: Vec<VendorListing> = (0..37)
            .map(|i| vendor(&format!("MLS-{i}"), 100_000.0))
            .collect();
        let feed = Arc::new(StaticFeed::new(listings));
        let reconciler = reconciler_for(&db, feed.clone());

        // default limit 100; 37 listings fit in one short page
        let report = reconciler.sync_listings(SyncOptions::default()).await.unwrap();

        assert_eq!(feed.requests(), 1);
        assert_eq!(report.records_processed, 37);
        assert_eq!(report.records_added, 37);
    }

    #[tokio::test]
    async fn test_full_pages_continue_pagination() {
        let db = test_db().await;
        let listings: Vec<VendorListing> = (0..5)
            .map(|i| vendor(&format!("MLS-{i}"), 100_000.0))
            .collect();
        let feed = Arc::new(StaticFeed::new(listings));
        let reconciler = reconciler_for(&db, feed.clone());

        let report = reconciler
            .sync_listings(SyncOptions {
                limit: Some(2),
                status: None,
            })
            .await
            .unwrap();

        // pages of 2, 2, 1 - the short third page ends the loop
        assert_eq!(feed.requests(), 3);
        assert_eq!(report.records_processed, 5);
        assert_eq!(report.records_added, 5);
    }

    #[tokio::test]
    async fn test_zero_limit_falls_back_to_default_page_size() {
        let db = test_db().await;
        let feed = Arc::new(StaticFeed::empty());
        let reconciler = reconciler_for(&db, feed.clone());

        let report = reconciler
            .sync_listings(SyncOptions {
                limit: Some(0),
                status: None,
            })
            .await
            .unwrap();

        // must terminate after one empty page, not spin on limit == len == 0
        assert_eq!(feed.requests(), 1);
        assert_eq!(report.records_processed, 0);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_and_keeps_partial_progress() {
        let db = test_db().await;
        let feed = Arc::new(StaticFeed::new(vec![
            vendor("MLS-1", 100_000.0),
            vendor("MLS-2", 200_000.0),
            vendor("MLS-3", 300_000.0),
        ]));
        let store = FailingStore {
            inner: SqliteListingStore::new(db.clone()),
            fail_on_mls: "MLS-3".to_string(),
        };
        let reconciler = Reconciler::new(
            feed,
            Arc::new(store),
            db.sync_logs(),
            SyncDefaults::default(),
        );

        let err = reconciler
            .sync_listings(SyncOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Database(_)));

        // first two listings stay committed - no run-level rollback
        assert!(db.properties().find_by_mls_number("MLS-1").await.unwrap().is_some());
        assert!(db.properties().find_by_mls_number("MLS-2").await.unwrap().is_some());
        assert!(db.properties().find_by_mls_number("MLS-3").await.unwrap().is_none());

        let logs = db.sync_logs().recent(1).await.unwrap();
        assert_eq!(logs[0].status, SyncLogStatus::Error);
        assert_eq!(logs[0].records_processed, 3);
        assert_eq!(logs[0].records_added, 2);
        assert_eq!(logs[0].records_updated, 0);
        assert_eq!(logs[0].error_message.as_deref(), Some("Store operation failed: Query failed: disk I/O error"));
    }

    #[tokio::test]
    async fn test_duplicate_mls_within_one_run_updates() {
        let db = test_db().await;
        let feed = Arc::new(StaticFeed::new(vec![
            vendor("MLS-1", 100_000.0),
            vendor("MLS-1", 150_000.0),
        ]));
        let reconciler = reconciler_for(&db, feed);

        let report = reconciler.sync_listings(SyncOptions::default()).await.unwrap();

        assert_eq!(report.records_processed, 2);
        assert_eq!(report.records_added, 1);
        assert_eq!(report.records_updated, 1);

        assert_eq!(db.properties().count().await.unwrap(), 1);
        let row = db
            .properties()
            .find_by_mls_number("MLS-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.price, 150_000.0);
    }

    #[tokio::test]
    async fn test_options_override_defaults_in_feed_query() {
        let db = test_db().await;
        let feed = Arc::new(StaticFeed::empty());
        let reconciler = reconciler_for(&db, feed.clone());

        // no options: the configured defaults reach the feed
        reconciler.sync_listings(SyncOptions::default()).await.unwrap();
        let query = feed.last_query().unwrap();
        assert_eq!(query.status, "Active");
        assert_eq!(query.limit, 100);
        assert_eq!(query.page, 1);

        // explicit options win over both defaults
        reconciler
            .sync_listings(SyncOptions {
                limit: Some(25),
                status: Some("Pending".to_string()),
            })
            .await
            .unwrap();
        let query = feed.last_query().unwrap();
        assert_eq!(query.status, "Pending");
        assert_eq!(query.limit, 25);

        // an empty status string falls back to the default filter
        reconciler
            .sync_listings(SyncOptions {
                limit: None,
                status: Some(String::new()),
            })
            .await
            .unwrap();
        assert_eq!(feed.last_query().unwrap().status, "Active");
    }
}
