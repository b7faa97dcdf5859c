//! # Sync Log Repository
//!
//! Bookkeeping for reconciliation runs. Purely observational: nothing reads
//! these rows to make decisions, they exist so an operator can answer "what
//! did the last sync do, and did it finish?".
//!
//! ## Entry Lifecycle
//! ```text
//! start("mls_listings")                 finalize_success(id, report)
//!   INSERT status=in_progress   ──►──┬──  UPDATE status=success,  counters
//!   counters zeroed                  │
//!                                    └──  finalize_error(id, report, msg)
//!                                         UPDATE status=error, counters
//!                                                error_message
//! ```
//! Exactly one finalize call per run, whichever path terminates it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use vista_core::{SyncLogEntry, SyncLogStatus, SyncReport};

/// Repository for sync log operations.
#[derive(Debug, Clone)]
pub struct SyncLogRepository {
    pool: SqlitePool,
}

impl SyncLogRepository {
    /// Creates a new SyncLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SyncLogRepository { pool }
    }

    /// Opens a new sync log entry with status `in_progress`.
    ///
    /// Returns the entry so the caller can retain its id for finalization.
    pub async fn start(&self, sync_type: &str) -> DbResult<SyncLogEntry> {
        let entry = SyncLogEntry {
            id: Uuid::new_v4().to_string(),
            sync_type: sync_type.to_string(),
            status: SyncLogStatus::InProgress,
            records_processed: 0,
            records_added: 0,
            records_updated: 0,
            records_deleted: 0,
            error_message: None,
            started_at: Utc::now(),
            completed_at: None,
        };

        debug!(sync_type = %sync_type, id = %entry.id, "Opening sync log entry");

        sqlx::query(
            r#"
            INSERT INTO sync_logs (
                id, sync_type, status,
                records_processed, records_added, records_updated, records_deleted,
                error_message, started_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.sync_type)
        .bind(entry.status)
        .bind(entry.records_processed)
        .bind(entry.records_added)
        .bind(entry.records_updated)
        .bind(entry.records_deleted)
        .bind(&entry.error_message)
        .bind(entry.started_at)
        .bind(entry.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Finalizes a run as successful, recording the final counters.
    pub async fn finalize_success(&self, id: &str, report: &SyncReport) -> DbResult<()> {
        self.finalize(id, SyncLogStatus::Success, report, None).await
    }

    /// Finalizes a run as failed, recording the error and counters so far.
    pub async fn finalize_error(
        &self,
        id: &str,
        report: &SyncReport,
        error_message: &str,
    ) -> DbResult<()> {
        self.finalize(id, SyncLogStatus::Error, report, Some(error_message))
            .await
    }

    async fn finalize(
        &self,
        id: &str,
        status: SyncLogStatus,
        report: &SyncReport,
        error_message: Option<&str>,
    ) -> DbResult<()> {
        debug!(id = %id, status = %status.as_str(), "Finalizing sync log entry");

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE sync_logs SET
                status = ?2,
                records_processed = ?3,
                records_added = ?4,
                records_updated = ?5,
                records_deleted = ?6,
                error_message = ?7,
                completed_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(report.records_processed)
        .bind(report.records_added)
        .bind(report.records_updated)
        .bind(report.records_deleted)
        .bind(error_message)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns the most recent entries, start time descending.
    ///
    /// Backs the `GET /api/mls/sync/status` endpoint.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<SyncLogEntry>> {
        let entries = sqlx::query_as::<_, SyncLogEntry>(
            r#"
            SELECT
                id, sync_type, status,
                records_processed, records_added, records_updated, records_deleted,
                error_message, started_at, completed_at
            FROM sync_logs
            ORDER BY started_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Fetches one entry by id.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<SyncLogEntry>> {
        let entry = sqlx::query_as::<_, SyncLogEntry>(
            r#"
            SELECT
                id, sync_type, status,
                records_processed, records_added, records_updated, records_deleted,
                error_message, started_at, completed_at
            FROM sync_logs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_start_opens_in_progress_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sync_logs();

        let entry = repo.start("mls_listings").await.unwrap();

        let stored = repo.find_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SyncLogStatus::InProgress);
        assert_eq!(stored.records_processed, 0);
        assert!(stored.completed_at.is_none());
        assert!(stored.error_message.is_none());
    }

    #[tokio::test]
    async fn test_finalize_success_records_counters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sync_logs();

        let entry = repo.start("mls_listings").await.unwrap();
        let report = SyncReport {
            records_processed: 37,
            records_added: 30,
            records_updated: 7,
            records_deleted: 0,
        };
        repo.finalize_success(&entry.id, &report).await.unwrap();

        let stored = repo.find_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SyncLogStatus::Success);
        assert_eq!(stored.records_processed, 37);
        assert_eq!(stored.records_added, 30);
        assert_eq!(stored.records_updated, 7);
        assert!(stored.completed_at.is_some());
        assert!(stored.error_message.is_none());
    }

    #[tokio::test]
    async fn test_finalize_error_records_message_and_partial_counters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sync_logs();

        let entry = repo.start("mls_listings").await.unwrap();
        let report = SyncReport {
            records_processed: 3,
            records_added: 2,
            records_updated: 0,
            records_deleted: 0,
        };
        repo.finalize_error(&entry.id, &report, "feed exploded")
            .await
            .unwrap();

        let stored = repo.find_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SyncLogStatus::Error);
        assert_eq!(stored.records_processed, 3);
        assert_eq!(stored.error_message.as_deref(), Some("feed exploded"));
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_recent_orders_by_start_time_desc() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sync_logs();

        let first = repo.start("mls_listings").await.unwrap();
        // SQLite TEXT timestamps have sub-millisecond precision via chrono,
        // but keep the ordering unambiguous anyway
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.start("mls_listings").await.unwrap();

        let entries = repo.recent(10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);

        let limited = repo.recent(1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, second.id);
    }
}
