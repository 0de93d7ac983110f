//! Database operations for the `snapshots` table.
//!
//! A snapshot row is written once by the scan pipeline and never rewritten,
//! with one exception: [`update_snapshot_analysis`] patches the four analysis
//! columns after the assessment engine responds. The two writers touch
//! disjoint column sets, so no locking is needed between them.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub public_id: Uuid,
    pub keyword_id: i64,
    pub domain: String,
    pub organic_rank: Option<i32>,
    pub organic_url: Option<String>,
    pub organic_title: Option<String>,
    pub ai_overview_cited: bool,
    pub ai_overview_position: Option<i32>,
    pub ai_overview_snippet: Option<String>,
    pub ai_mode_cited: bool,
    pub ai_mode_position: Option<i32>,
    pub ai_mode_snippet: Option<String>,
    pub ai_mode_status: String,
    pub screenshot_url: Option<String>,
    pub ai_mode_screenshot_url: Option<String>,
    pub sentiment_score: Option<Decimal>,
    pub content_gaps: Option<String>,
    pub strategy_suggestions: Option<String>,
    pub analysis_sources: Option<Value>,
    pub status: String,
    pub scan_duration_ms: i32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new snapshot. Analysis columns start NULL and are
/// filled later by the enricher's partial update.
#[derive(Debug, Clone, Default)]
pub struct NewSnapshot {
    pub keyword_id: i64,
    pub domain: String,
    pub organic_rank: Option<i32>,
    pub organic_url: Option<String>,
    pub organic_title: Option<String>,
    pub ai_overview_cited: bool,
    pub ai_overview_position: Option<i32>,
    pub ai_overview_snippet: Option<String>,
    pub ai_mode_cited: bool,
    pub ai_mode_position: Option<i32>,
    pub ai_mode_snippet: Option<String>,
    pub ai_mode_status: String,
    pub screenshot_url: Option<String>,
    pub ai_mode_screenshot_url: Option<String>,
    pub status: String,
    pub scan_duration_ms: i32,
}

const SNAPSHOT_COLUMNS: &str = "id, public_id, keyword_id, domain, \
     organic_rank, organic_url, organic_title, \
     ai_overview_cited, ai_overview_position, ai_overview_snippet, \
     ai_mode_cited, ai_mode_position, ai_mode_snippet, ai_mode_status, \
     screenshot_url, ai_mode_screenshot_url, \
     sentiment_score, content_gaps, strategy_suggestions, analysis_sources, \
     status, scan_duration_ms, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a new snapshot and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including check-constraint
/// violations of the cited/position invariant).
pub async fn insert_snapshot(pool: &PgPool, snapshot: &NewSnapshot) -> Result<SnapshotRow, DbError> {
    let row = sqlx::query_as::<_, SnapshotRow>(&format!(
        "INSERT INTO snapshots \
             (keyword_id, domain, organic_rank, organic_url, organic_title, \
              ai_overview_cited, ai_overview_position, ai_overview_snippet, \
              ai_mode_cited, ai_mode_position, ai_mode_snippet, ai_mode_status, \
              screenshot_url, ai_mode_screenshot_url, status, scan_duration_ms) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {SNAPSHOT_COLUMNS}"
    ))
    .bind(snapshot.keyword_id)
    .bind(&snapshot.domain)
    .bind(snapshot.organic_rank)
    .bind(&snapshot.organic_url)
    .bind(&snapshot.organic_title)
    .bind(snapshot.ai_overview_cited)
    .bind(snapshot.ai_overview_position)
    .bind(&snapshot.ai_overview_snippet)
    .bind(snapshot.ai_mode_cited)
    .bind(snapshot.ai_mode_position)
    .bind(&snapshot.ai_mode_snippet)
    .bind(&snapshot.ai_mode_status)
    .bind(&snapshot.screenshot_url)
    .bind(&snapshot.ai_mode_screenshot_url)
    .bind(&snapshot.status)
    .bind(snapshot.scan_duration_ms)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns a snapshot by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_snapshot(pool: &PgPool, snapshot_id: i64) -> Result<Option<SnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, SnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE id = $1"
    ))
    .bind(snapshot_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Cache lookup: the most recent snapshot for `(keyword_id, domain)` created
/// within the last `ttl_hours`, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_recent_snapshot(
    pool: &PgPool,
    keyword_id: i64,
    domain: &str,
    ttl_hours: i64,
) -> Result<Option<SnapshotRow>, DbError> {
    let cutoff = Utc::now() - Duration::hours(ttl_hours);

    let row = sqlx::query_as::<_, SnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM snapshots \
         WHERE keyword_id = $1 AND domain = $2 AND created_at >= $3 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(keyword_id)
    .bind(domain)
    .bind(cutoff)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the most recent snapshot per keyword id, in one query.
///
/// Keywords with no snapshot are simply absent from the result — callers map
/// that to a pending state.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_snapshots_for_keywords(
    pool: &PgPool,
    keyword_ids: &[i64],
) -> Result<Vec<SnapshotRow>, DbError> {
    if keyword_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, SnapshotRow>(&format!(
        "SELECT DISTINCT ON (keyword_id) {SNAPSHOT_COLUMNS} \
         FROM snapshots \
         WHERE keyword_id = ANY($1) \
         ORDER BY keyword_id, created_at DESC, id DESC"
    ))
    .bind(keyword_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Patch only the analysis columns of a snapshot.
///
/// Rank and citation columns committed by the scan are never touched here —
/// this partial-update discipline is what lets the enricher run concurrently
/// with readers without locking.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no snapshot has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_snapshot_analysis(
    pool: &PgPool,
    snapshot_id: i64,
    sentiment_score: Decimal,
    content_gaps: Option<&str>,
    strategy_suggestions: Option<&str>,
    analysis_sources: Option<Value>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE snapshots \
         SET sentiment_score = $1, content_gaps = $2, strategy_suggestions = $3, \
             analysis_sources = $4 \
         WHERE id = $5",
    )
    .bind(sentiment_score)
    .bind(content_gaps)
    .bind(strategy_suggestions)
    .bind(analysis_sources)
    .bind(snapshot_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
