//! Read endpoints over persisted snapshots.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use aivis_core::{DisplayStatus, VisibilitySignals};
use aivis_db::SnapshotRow;
use aivis_scan::{AiModeStatus, KeywordSnapshot, RankMatch, ScanStatus};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct LatestSnapshotsQuery {
    pub project_id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct KeywordVisibilityItem {
    pub keyword_id: i64,
    pub term: String,
    pub display_status: DisplayStatus,
    pub snapshot: Option<SnapshotItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct SnapshotItem {
    pub id: i64,
    pub domain: String,
    pub organic_rank: Option<i32>,
    pub organic_url: Option<String>,
    pub ai_overview_cited: bool,
    pub ai_overview_position: Option<i32>,
    pub ai_mode_cited: bool,
    pub ai_mode_position: Option<i32>,
    pub ai_mode_status: String,
    pub sentiment_score: Option<Decimal>,
    pub content_gaps: Option<String>,
    pub strategy_suggestions: Option<String>,
    pub analysis_sources: Option<Value>,
    pub screenshot_url: Option<String>,
    pub ai_mode_screenshot_url: Option<String>,
    pub status: String,
    pub scan_duration_ms: i32,
    pub created_at: DateTime<Utc>,
    /// True until the enricher has patched the analysis fields (or the
    /// snapshot was never eligible).
    pub analysis_pending: bool,
}

/// Latest visibility per keyword of a project, with the derived display
/// status. Keywords without any snapshot surface as `pending`.
pub(super) async fn list_latest_snapshots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LatestSnapshotsQuery>,
) -> Result<Json<ApiResponse<Vec<KeywordVisibilityItem>>>, ApiError> {
    let keywords = aivis_db::list_keywords(&state.pool, query.project_id, true)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let keyword_ids: Vec<i64> = keywords.iter().map(|k| k.id).collect();
    let latest = aivis_db::latest_snapshots_for_keywords(&state.pool, &keyword_ids)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = keywords
        .into_iter()
        .map(|keyword| {
            let row = latest.iter().find(|s| s.keyword_id == keyword.id);
            let display_status = DisplayStatus::derive(row.map(signals).as_ref());
            KeywordVisibilityItem {
                keyword_id: keyword.id,
                term: keyword.term,
                display_status,
                snapshot: row.map(to_item),
            }
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn signals(row: &SnapshotRow) -> VisibilitySignals {
    VisibilitySignals {
        sentiment_score: row.sentiment_score.as_ref().and_then(Decimal::to_f64),
        ai_overview_cited: row.ai_overview_cited,
        ai_mode_cited: row.ai_mode_cited,
        organic_rank: row.organic_rank,
    }
}

fn to_item(row: &SnapshotRow) -> SnapshotItem {
    SnapshotItem {
        id: row.id,
        domain: row.domain.clone(),
        organic_rank: row.organic_rank,
        organic_url: row.organic_url.clone(),
        ai_overview_cited: row.ai_overview_cited,
        ai_overview_position: row.ai_overview_position,
        ai_mode_cited: row.ai_mode_cited,
        ai_mode_position: row.ai_mode_position,
        ai_mode_status: row.ai_mode_status.clone(),
        sentiment_score: row.sentiment_score,
        content_gaps: row.content_gaps.clone(),
        strategy_suggestions: row.strategy_suggestions.clone(),
        analysis_sources: row.analysis_sources.clone(),
        screenshot_url: row.screenshot_url.clone(),
        ai_mode_screenshot_url: row.ai_mode_screenshot_url.clone(),
        status: row.status.clone(),
        scan_duration_ms: row.scan_duration_ms,
        created_at: row.created_at,
        analysis_pending: row.sentiment_score.is_none()
            && (row.ai_overview_cited || row.ai_mode_cited),
    }
}

/// Rehydrates a stored row into the in-memory measurement shape, used when
/// the scan endpoint answers from the recent-snapshot cache.
pub(super) fn row_to_measurement(term: &str, row: &SnapshotRow) -> KeywordSnapshot {
    let ai_mode_status = match row.ai_mode_status.as_str() {
        "cited" => AiModeStatus::Cited,
        "not_cited" => AiModeStatus::NotCited,
        _ => AiModeStatus::NotFound,
    };
    let status = if row.status == "failed" {
        ScanStatus::Failed
    } else {
        ScanStatus::Scanned
    };

    KeywordSnapshot {
        keyword_id: row.keyword_id,
        term: term.to_string(),
        domain: row.domain.clone(),
        organic: RankMatch {
            cited: row.organic_rank.is_some(),
            position: row.organic_rank,
            url: row.organic_url.clone(),
            title: row.organic_title.clone(),
            snippet: None,
        },
        ai_overview: RankMatch {
            cited: row.ai_overview_cited,
            position: row.ai_overview_position,
            url: None,
            title: None,
            snippet: row.ai_overview_snippet.clone(),
        },
        ai_mode: RankMatch {
            cited: row.ai_mode_cited,
            position: row.ai_mode_position,
            url: None,
            title: None,
            snippet: row.ai_mode_snippet.clone(),
        },
        ai_mode_status,
        ai_overview_text: None,
        screenshot_url: row.screenshot_url.clone(),
        ai_mode_screenshot_url: row.ai_mode_screenshot_url.clone(),
        status,
        scan_duration_ms: row.scan_duration_ms,
    }
}
