//! # API Routes
//!
//! Thin handlers over the reconciler and the sync log. No additional logic
//! lives here: the trigger endpoint forwards its JSON body as sync options
//! and serializes the resulting report; failures surface as a single JSON
//! error object with HTTP 500.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use vista_core::{SyncLogEntry, SyncReport};
use vista_db::Database;
use vista_sync::{Reconciler, SyncError, SyncOptions};

/// Default number of sync log rows returned by the status endpoint.
const DEFAULT_STATUS_LIMIT: u32 = 10;

// =============================================================================
// State
// =============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (pool clone).
    pub db: Database,
    /// The reconciliation engine.
    pub reconciler: Arc<Reconciler>,
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/mls/sync", post(trigger_sync))
        .route("/api/mls/sync/status", get(sync_status))
        .route("/health", get(health))
        .with_state(state)
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Wraps sync errors for HTTP responses.
///
/// Every failure becomes `500 {"success": false, "error": <message>}`; no
/// structured error codes are defined for this surface.
pub struct ApiError(SyncError);

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        ApiError(err)
    }
}

impl From<vista_db::DbError> for ApiError {
    fn from(err: vista_db::DbError) -> Self {
        ApiError(SyncError::Database(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": self.0.to_string() })),
        )
            .into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Response body for a successful sync trigger.
#[derive(Debug, Serialize)]
struct SyncResponse {
    success: bool,
    message: String,
    #[serde(flatten)]
    report: SyncReport,
}

/// `POST /api/mls/sync` - runs one reconciliation.
///
/// Body is optional JSON `{limit?, status?}`; both fall back to configured
/// defaults when absent.
async fn trigger_sync(
    State(state): State<AppState>,
    body: Option<Json<SyncOptions>>,
) -> Result<Json<SyncResponse>, ApiError> {
    let options = body.map(|Json(options)| options).unwrap_or_default();

    let report = state.reconciler.sync_listings(options).await?;

    Ok(Json(SyncResponse {
        success: true,
        message: "MLS sync completed".to_string(),
        report,
    }))
}

/// Query parameters for the status endpoint.
#[derive(Debug, Deserialize)]
struct StatusParams {
    limit: Option<u32>,
}

/// `GET /api/mls/sync/status?limit=N` - recent sync runs, newest first.
async fn sync_status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<Vec<SyncLogEntry>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_STATUS_LIMIT);
    let entries = state.db.sync_logs().recent(limit).await?;
    Ok(Json(entries))
}

/// `GET /health` - database liveness probe.
async fn health(State(state): State<AppState>) -> Response {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
            .into_response()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use vista_core::VendorListing;
    use vista_db::DbConfig;
    use vista_sync::config::SyncDefaults;
    use vista_sync::{SqliteListingStore, StaticFeed};

    async fn test_state(listings: Vec<VendorListing>) -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reconciler = Reconciler::new(
            Arc::new(StaticFeed::new(listings)),
            Arc::new(SqliteListingStore::new(db.clone())),
            db.sync_logs(),
            SyncDefaults::default(),
        );
        AppState {
            db,
            reconciler: Arc::new(reconciler),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_trigger_sync_reports_counts() {
        let listings = vec![
            VendorListing::from_value(json!({ "ListingId": "MLS-1", "ListPrice": 100000 })),
            VendorListing::from_value(json!({ "ListingId": "MLS-2", "ListPrice": 200000 })),
        ];
        let app = router(test_state(listings).await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/mls/sync")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["recordsProcessed"], 2);
        assert_eq!(body["recordsAdded"], 2);
        assert_eq!(body["recordsUpdated"], 0);
        assert_eq!(body["recordsDeleted"], 0);
    }

    #[tokio::test]
    async fn test_trigger_sync_accepts_options_body() {
        let app = router(test_state(Vec::new()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/mls/sync")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"limit": 5, "status": "Pending"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["recordsProcessed"], 0);
    }

    #[tokio::test]
    async fn test_status_endpoint_lists_recent_runs() {
        let state = test_state(Vec::new()).await;
        let app = router(state.clone());

        // one completed run to report on
        state
            .reconciler
            .sync_listings(SyncOptions::default())
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/mls/sync/status?limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let runs = body.as_array().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0]["status"], "success");
        assert_eq!(runs[0]["sync_type"], "mls_listings");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(test_state(Vec::new()).await);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
