//! # Sync Configuration
//!
//! Configuration for the reconciliation engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VISTA_FEED_URL=https://feed.example.com/listings                   │
//! │     VISTA_FEED_TOKEN=...                                               │
//! │     VISTA_DB_PATH=/var/lib/vista/vista.db                              │
//! │     VISTA_PAGE_SIZE=100                                                │
//! │     VISTA_SYNC_STATUS=Active                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ./vista.toml (or the path handed to `load`)                        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     page_size = 100, status = "Active", path = ./vista.db              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # vista.toml
//! [feed]
//! base_url = "https://feed.example.com/listings"
//! auth_token = "secret"
//! timeout_secs = 30
//!
//! [sync]
//! page_size = 100
//! status = "Active"
//!
//! [database]
//! path = "vista.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Defaults
// =============================================================================

/// Default feed page size when neither options nor config say otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default vendor status filter for sync runs.
pub const DEFAULT_STATUS_FILTER: &str = "Active";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_PATH: &str = "vista.db";

// =============================================================================
// Sections
// =============================================================================

/// Vendor feed connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the vendor listing endpoint.
    pub base_url: String,

    /// Optional bearer token for the feed.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            base_url: String::new(),
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Per-run defaults, overridable per invocation via `SyncOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncDefaults {
    /// Feed page size.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Vendor status filter sent to the feed.
    #[serde(default = "default_status_filter")]
    pub status: String,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_status_filter() -> String {
    DEFAULT_STATUS_FILTER.to_string()
}

impl Default for SyncDefaults {
    fn default() -> Self {
        SyncDefaults {
            page_size: DEFAULT_PAGE_SIZE,
            status: DEFAULT_STATUS_FILTER.to_string(),
        }
    }
}

/// Local database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_db_path(),
        }
    }
}

// =============================================================================
// Sync Config
// =============================================================================

/// Top-level configuration for the sync engine and its binaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Vendor feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Per-run defaults.
    #[serde(default)]
    pub sync: SyncDefaults,

    /// Local database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl SyncConfig {
    /// Loads configuration: TOML file (if present) with env overrides on top.
    ///
    /// A missing file is not an error - defaults apply and env vars can still
    /// fill in the feed URL. A file that exists but fails to parse IS an
    /// error; silently ignoring a typo'd config is worse than failing.
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            debug!(path = %path.display(), "Loading config file");
            let raw = std::fs::read_to_string(path)
                .map_err(|e| SyncError::ConfigLoadFailed(e.to_string()))?;
            toml::from_str(&raw).map_err(|e| SyncError::ConfigLoadFailed(e.to_string()))?
        } else {
            warn!(path = %path.display(), "Config file not found, using defaults + env");
            SyncConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies `VISTA_*` environment variable overrides in place.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("VISTA_FEED_URL") {
            self.feed.base_url = value;
        }
        if let Ok(value) = std::env::var("VISTA_FEED_TOKEN") {
            self.feed.auth_token = Some(value);
        }
        if let Ok(value) = std::env::var("VISTA_DB_PATH") {
            self.database.path = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("VISTA_PAGE_SIZE") {
            match value.parse::<u32>() {
                Ok(size) if size > 0 => self.sync.page_size = size,
                _ => warn!(value = %value, "Ignoring invalid VISTA_PAGE_SIZE"),
            }
        }
        if let Ok(value) = std::env::var("VISTA_SYNC_STATUS") {
            self.sync.status = value;
        }
    }

    /// Validates the parts a sync run actually needs.
    ///
    /// ## Checks
    /// - feed URL present and parseable
    /// - page size non-zero (a zero limit would loop forever on short-page
    ///   detection)
    pub fn validate(&self) -> SyncResult<()> {
        if self.feed.base_url.is_empty() {
            return Err(SyncError::InvalidConfig(
                "feed.base_url is required (or set VISTA_FEED_URL)".to_string(),
            ));
        }
        Url::parse(&self.feed.base_url)
            .map_err(|e| SyncError::InvalidUrl(format!("{}: {}", self.feed.base_url, e)))?;

        if self.sync.page_size == 0 {
            return Err(SyncError::InvalidConfig(
                "sync.page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
