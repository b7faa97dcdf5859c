//! # Vista API
//!
//! HTTP trigger surface for the MLS reconciliation engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Vista API Server                                │
//! │                                                                         │
//! │  POST /api/mls/sync ────► Reconciler.sync_listings ───► SQLite         │
//! │  GET  /api/mls/sync/status ────► sync_logs.recent  ───►   │            │
//! │  GET  /health ─────────► db.health_check           ───►   │            │
//! │                                                                         │
//! │  Feed: HttpFeedClient when feed.base_url is configured,                │
//! │        StaticFeed::empty() stub otherwise                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod routes;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vista_db::{Database, DbConfig};
use vista_sync::{FeedClient, HttpFeedClient, Reconciler, SqliteListingStore, StaticFeed, SyncConfig};

use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (RUST_LOG controls verbosity, default info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting Vista API server");

    // Load configuration: TOML file + VISTA_* env overrides
    let config_path =
        std::env::var("VISTA_CONFIG").unwrap_or_else(|_| "vista.toml".to_string());
    let config = SyncConfig::load(&config_path)?;

    // Connect to the database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database.path)).await?;
    info!(path = %config.database.path.display(), "Database ready");

    // Pick the feed implementation: real HTTP client, or the empty stub when
    // no vendor endpoint is configured yet
    let feed: Arc<dyn FeedClient> = if config.feed.base_url.is_empty() {
        warn!("No feed.base_url configured; sync will run against the empty stub feed");
        Arc::new(StaticFeed::empty())
    } else {
        config.validate()?;
        Arc::new(HttpFeedClient::new(&config.feed)?)
    };

    let reconciler = Reconciler::new(
        feed,
        Arc::new(SqliteListingStore::new(db.clone())),
        db.sync_logs(),
        config.sync.clone(),
    );

    let state = AppState {
        db,
        reconciler: Arc::new(reconciler),
    };

    let addr = std::env::var("VISTA_API_ADDR").unwrap_or_else(|_| "0.0.0.0:4000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
