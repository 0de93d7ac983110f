//! Database operations for the `keywords` table.
//!
//! Keyword removal is a soft delete: `is_active` flips to false and the row —
//! with its snapshot history — is retained.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `keywords` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordRow {
    pub id: i64,
    pub public_id: Uuid,
    pub project_id: i64,
    pub term: String,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

const KEYWORD_COLUMNS: &str = "id, public_id, project_id, term, location, is_active, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a keyword for a project, or revive it if it already exists.
///
/// A term that was previously soft-deleted is reactivated rather than
/// duplicated; the original row (and its snapshot history) is kept.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_keyword(
    pool: &PgPool,
    project_id: i64,
    term: &str,
    location: &str,
) -> Result<KeywordRow, DbError> {
    let row = sqlx::query_as::<_, KeywordRow>(&format!(
        "INSERT INTO keywords (project_id, term, location) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (project_id, term) DO UPDATE SET is_active = true \
         RETURNING {KEYWORD_COLUMNS}"
    ))
    .bind(project_id)
    .bind(term)
    .bind(location)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns a keyword by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_keyword(pool: &PgPool, keyword_id: i64) -> Result<Option<KeywordRow>, DbError> {
    let row = sqlx::query_as::<_, KeywordRow>(&format!(
        "SELECT {KEYWORD_COLUMNS} FROM keywords WHERE id = $1"
    ))
    .bind(keyword_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a project's keywords, newest first.
///
/// With `active_only`, soft-deleted keywords are filtered out — this is the
/// view batch scans operate on.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_keywords(
    pool: &PgPool,
    project_id: i64,
    active_only: bool,
) -> Result<Vec<KeywordRow>, DbError> {
    let rows = if active_only {
        sqlx::query_as::<_, KeywordRow>(&format!(
            "SELECT {KEYWORD_COLUMNS} FROM keywords \
             WHERE project_id = $1 AND is_active \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, KeywordRow>(&format!(
            "SELECT {KEYWORD_COLUMNS} FROM keywords \
             WHERE project_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?
    };

    Ok(rows)
}

/// Soft-delete a keyword: flips `is_active` to false, keeps the row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no keyword has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn deactivate_keyword(pool: &PgPool, keyword_id: i64) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE keywords SET is_active = false WHERE id = $1")
        .bind(keyword_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Returns up to `limit` active keywords whose most recent snapshot is older
/// than `stale_cutoff` (or that have never been scanned), oldest-scanned first.
///
/// This is the producer query for the scheduled ingestion trigger.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stale_active_keywords(
    pool: &PgPool,
    stale_cutoff: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<KeywordRow>, DbError> {
    let rows = sqlx::query_as::<_, KeywordRow>(
        "SELECT k.id, k.public_id, k.project_id, k.term, k.location, k.is_active, k.created_at \
         FROM keywords k \
         LEFT JOIN LATERAL ( \
             SELECT s.created_at FROM snapshots s \
             WHERE s.keyword_id = k.id \
             ORDER BY s.created_at DESC, s.id DESC \
             LIMIT 1 \
         ) latest ON true \
         WHERE k.is_active \
           AND (latest.created_at IS NULL OR latest.created_at < $1) \
         ORDER BY latest.created_at ASC NULLS FIRST, k.id \
         LIMIT $2",
    )
    .bind(stale_cutoff)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
