//! Scheduled ingestion trigger.
//!
//! An external cron service calls this endpoint with a shared secret; it
//! selects a bounded number of active keywords whose latest scan has gone
//! stale and enqueues them. The queue-drain job picks them up from there —
//! this endpoint never scans anything itself.

use axum::{extract::State, http::HeaderMap, Extension, Json};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::middleware::{cron_secret_matches, RequestId};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct CronScanResponseData {
    pub queued: u64,
}

pub(super) async fn trigger_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<CronScanResponseData>>, ApiError> {
    if !cron_secret_matches(&headers, state.config.cron_secret.as_deref()) {
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "missing or invalid cron secret",
        ));
    }

    let cutoff = Utc::now() - Duration::hours(state.config.cron_stale_after_hours);
    let stale = aivis_db::list_stale_active_keywords(&state.pool, cutoff, state.config.cron_scan_limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let keyword_ids: Vec<i64> = stale.iter().map(|k| k.id).collect();
    let queued = aivis_db::enqueue_keywords(&state.pool, &keyword_ids)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(queued, "cron trigger enqueued stale keywords");

    Ok(Json(ApiResponse {
        data: CronScanResponseData { queued },
        meta: ResponseMeta::new(req_id.0),
    }))
}
