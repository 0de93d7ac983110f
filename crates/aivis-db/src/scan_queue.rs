//! Database operations for the `scan_queue` table.
//!
//! The scheduled ingestion trigger enqueues stale keywords here; a drain job
//! claims pending items and feeds them to the batch scheduler. The queue's
//! cadence is the only retry mechanism for failed keywords — the scan
//! pipeline itself never retries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `scan_queue` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScanQueueRow {
    pub id: i64,
    pub keyword_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Enqueue a pending scan for each keyword id. Returns the number inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn enqueue_keywords(pool: &PgPool, keyword_ids: &[i64]) -> Result<u64, DbError> {
    if keyword_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        "INSERT INTO scan_queue (keyword_id) \
         SELECT unnest($1::bigint[])",
    )
    .bind(keyword_ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Claim up to `limit` pending queue items, oldest first, flipping them to
/// `processing` in the same statement.
///
/// `FOR UPDATE SKIP LOCKED` plus the single-statement claim means concurrent
/// drain runs never double-claim an item.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn take_pending_queue(pool: &PgPool, limit: i64) -> Result<Vec<ScanQueueRow>, DbError> {
    let rows = sqlx::query_as::<_, ScanQueueRow>(
        "WITH claimed AS ( \
             SELECT id FROM scan_queue \
             WHERE status = 'pending' \
             ORDER BY created_at, id \
             LIMIT $1 \
             FOR UPDATE SKIP LOCKED \
         ) \
         UPDATE scan_queue q \
         SET status = 'processing' \
         FROM claimed \
         WHERE q.id = claimed.id \
         RETURNING q.id, q.keyword_id, q.status, q.created_at, q.processed_at",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Mark a queue item `done` or `failed` and stamp `processed_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no queue item has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_queue_item(pool: &PgPool, queue_id: i64, status: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scan_queue \
         SET status = $1, processed_at = NOW() \
         WHERE id = $2",
    )
    .bind(status)
    .bind(queue_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
