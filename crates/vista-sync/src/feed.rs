//! # Feed Client
//!
//! Access to the external MLS vendor feed.
//!
//! ## Contract
//! ```text
//! fetch_listings({page, limit, status}) -> {listings, total, page, limit}
//! ```
//!
//! The reconciler treats a returned page SHORTER than `limit` as "no more
//! pages" - the feed is not required to report an accurate `total`, and this
//! implementation never relies on it.
//!
//! Two implementations:
//! - [`HttpFeedClient`] - real HTTP access via reqwest
//! - [`StaticFeed`] - in-memory pages for tests and wiring without vendor
//!   credentials

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::FeedConfig;
use crate::error::{SyncError, SyncResult};
use vista_core::VendorListing;

// =============================================================================
// Wire Types
// =============================================================================

/// Parameters for one page request.
#[derive(Debug, Clone, Serialize)]
pub struct FeedQuery {
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Vendor status filter (e.g. "Active").
    pub status: String,
}

/// One page of vendor listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedPage {
    /// Listings in feed-delivery order.
    #[serde(default)]
    pub listings: Vec<VendorListing>,

    /// Vendor-reported total matching listings (informational only).
    #[serde(default)]
    pub total: i64,

    /// Page number echoed back.
    #[serde(default)]
    pub page: u32,

    /// Page size echoed back.
    #[serde(default)]
    pub limit: u32,
}

// =============================================================================
// Feed Client Trait
// =============================================================================

/// Abstraction over the vendor feed.
///
/// The reconciler only ever calls this sequentially; implementations do not
/// need to be re-entrant per run, just `Send + Sync` for sharing.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetches one page of listings.
    async fn fetch_listings(&self, query: &FeedQuery) -> SyncResult<FeedPage>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// Real vendor feed access over HTTP.
///
/// Sends `GET <base_url>?page=N&limit=M&status=S` with an optional bearer
/// token and decodes the JSON body as a [`FeedPage`].
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpFeedClient {
    /// Builds a client from feed configuration.
    pub fn new(config: &FeedConfig) -> SyncResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SyncError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::FeedRequestFailed(e.to_string()))?;

        Ok(HttpFeedClient {
            http,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch_listings(&self, query: &FeedQuery) -> SyncResult<FeedPage> {
        debug!(
            url = %self.base_url,
            page = query.page,
            limit = query.limit,
            status = %query.status,
            "Fetching feed page"
        );

        let mut request = self.http.get(self.base_url.clone()).query(&[
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
            ("status", query.status.clone()),
        ]);

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let page = response.json::<FeedPage>().await?;

        debug!(count = page.listings.len(), total = page.total, "Feed page received");
        Ok(page)
    }
}

// =============================================================================
// Static Implementation
// =============================================================================

/// In-memory feed serving a fixed listing set, paginated on demand.
///
/// `StaticFeed::empty()` is the wiring stub for deployments without vendor
/// credentials. Every query served is recorded, so tests can assert both how
/// many pages the reconciler asked for ([`StaticFeed::requests`]) and which
/// page/limit/status parameters actually reached the feed
/// ([`StaticFeed::last_query`]).
#[derive(Debug, Default)]
pub struct StaticFeed {
    listings: Vec<VendorListing>,
    queries: Mutex<Vec<FeedQuery>>,
}

impl StaticFeed {
    /// A feed with no listings at all.
    pub fn empty() -> Self {
        StaticFeed::default()
    }

    /// A feed serving the given listings in order.
    pub fn new(listings: Vec<VendorListing>) -> Self {
        StaticFeed {
            listings,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// How many page requests have been served.
    pub fn requests(&self) -> u32 {
        self.queries().len() as u32
    }

    /// The most recently served query, if any.
    pub fn last_query(&self) -> Option<FeedQuery> {
        self.queries().last().cloned()
    }

    fn queries(&self) -> MutexGuard<'_, Vec<FeedQuery>> {
        self.queries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FeedClient for StaticFeed {
    async fn fetch_listings(&self, query: &FeedQuery) -> SyncResult<FeedPage> {
        self.queries().push(query.clone());

        let start = (query.page.saturating_sub(1) as usize) * query.limit as usize;
        let listings: Vec<VendorListing> = self
            .listings
            .iter()
            .skip(start)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(FeedPage {
            listings,
            total: self.listings.len() as i64,
            page: query.page,
            limit: query.limit,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listings(n: usize) -> Vec<VendorListing> {
        (0..n)
            .map(|i| VendorListing::from_value(json!({ "ListingId": format!("MLS-{i}") })))
            .collect()
    }

    #[tokio::test]
    async fn test_static_feed_paginates() {
        let feed = StaticFeed::new(listings(5));

        let q = |page| FeedQuery {
            page,
            limit: 2,
            status: "Active".to_string(),
        };

        let first = feed.fetch_listings(&q(1)).await.unwrap();
        assert_eq!(first.listings.len(), 2);
        let second = feed.fetch_listings(&q(2)).await.unwrap();
        assert_eq!(second.listings.len(), 2);
        let third = feed.fetch_listings(&q(3)).await.unwrap();
        assert_eq!(third.listings.len(), 1);
        let fourth = feed.fetch_listings(&q(4)).await.unwrap();
        assert!(fourth.listings.is_empty());

        assert_eq!(feed.requests(), 4);
        assert_eq!(feed.last_query().unwrap().page, 4);
        assert_eq!(first.total, 5);
    }

    #[tokio::test]
    async fn test_empty_stub_returns_empty_page() {
        let feed = StaticFeed::empty();
        let page = feed
            .fetch_listings(&FeedQuery {
                page: 1,
                limit: 100,
                status: "Active".to_string(),
            })
            .await
            .unwrap();
        assert!(page.listings.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_feed_page_decodes_with_missing_fields() {
        // vendors are sloppy; every envelope field is optional on the wire
        let page: FeedPage = serde_json::from_value(json!({
            "listings": [{ "ListingId": "MLS-1" }],
        }))
        .unwrap();
        assert_eq!(page.listings.len(), 1);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_http_client_rejects_bad_url() {
        let config = FeedConfig {
            base_url: "not a url".to_string(),
            auth_token: None,
            timeout_secs: 5,
        };
        assert!(matches!(
            HttpFeedClient::new(&config),
            Err(SyncError::InvalidUrl(_))
        ));
    }
}
