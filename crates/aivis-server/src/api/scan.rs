//! Scan endpoints: single keyword and batch.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use aivis_db::NewSnapshot;
use aivis_scan::{BatchScheduler, KeywordSnapshot, KeywordSpec, ScanError};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_LOCATION: &str = "United States";

#[derive(Debug, Deserialize)]
pub(super) struct ScanRequest {
    pub keyword: String,
    pub domain: String,
    pub location: Option<String>,
    pub keyword_id: Option<i64>,
    /// Skip the recent-snapshot cache and force a fresh scan.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ScanResponseData {
    pub snapshot: KeywordSnapshot,
    pub snapshot_id: Option<i64>,
    /// False when the scan computed a result but durable storage failed or
    /// was not attempted — the measurement is still returned.
    pub persisted: bool,
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct BatchScanRequest {
    pub project_id: Option<i64>,
    pub keyword_ids: Option<Vec<i64>>,
    pub domain: Option<String>,
    pub location: Option<String>,
    pub window: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct BatchEntry {
    pub snapshot: KeywordSnapshot,
    pub snapshot_id: Option<i64>,
    pub persisted: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct BatchScanResponseData {
    pub total: usize,
    pub results: Vec<BatchEntry>,
}

/// Maps a computed measurement onto the snapshot insert payload.
pub(crate) fn to_new_snapshot(keyword_id: i64, snapshot: &KeywordSnapshot) -> NewSnapshot {
    NewSnapshot {
        keyword_id,
        domain: snapshot.domain.clone(),
        organic_rank: snapshot.organic.position,
        organic_url: snapshot.organic.url.clone(),
        organic_title: snapshot.organic.title.clone(),
        ai_overview_cited: snapshot.ai_overview.cited,
        ai_overview_position: snapshot.ai_overview.position,
        ai_overview_snippet: snapshot
            .ai_overview
            .snippet
            .clone()
            .or_else(|| snapshot.ai_overview_text.clone()),
        ai_mode_cited: snapshot.ai_mode.cited,
        ai_mode_position: snapshot.ai_mode.position,
        ai_mode_snippet: snapshot.ai_mode.snippet.clone(),
        ai_mode_status: snapshot.ai_mode_status.as_str().to_string(),
        screenshot_url: snapshot.screenshot_url.clone(),
        ai_mode_screenshot_url: snapshot.ai_mode_screenshot_url.clone(),
        status: snapshot.status.as_str().to_string(),
        scan_duration_ms: snapshot.scan_duration_ms,
    }
}

/// Persist a measurement and kick off enrichment. A storage failure is
/// logged and reported through the `persisted` flag; the computed result is
/// still returned to the caller.
pub(super) async fn persist_and_enrich(
    state: &AppState,
    keyword_id: i64,
    snapshot: &KeywordSnapshot,
) -> (Option<i64>, bool) {
    match aivis_db::insert_snapshot(&state.pool, &to_new_snapshot(keyword_id, snapshot)).await {
        Ok(row) => {
            if let Some(enricher) = &state.enricher {
                let _ = enricher.spawn(row.id, snapshot);
            }
            (Some(row.id), true)
        }
        Err(e) => {
            tracing::error!(keyword_id, error = %e, "snapshot persistence failed; returning computed result");
            (None, false)
        }
    }
}

fn map_scan_error(request_id: String, error: &ScanError) -> ApiError {
    match error {
        ScanError::Validation(reason) => {
            ApiError::new(request_id, "validation_error", reason.clone())
        }
        ScanError::AllSourcesFailed { .. } => ApiError::new(
            request_id,
            "source_unavailable",
            "all search surfaces failed for this keyword",
        ),
    }
}

pub(super) async fn scan_keyword(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ApiResponse<ScanResponseData>>, ApiError> {
    if request.keyword.trim().is_empty() || request.domain.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "keyword and domain are required",
        ));
    }

    let Some(executor) = state.executor.clone() else {
        return Err(ApiError::new(
            req_id.0,
            "scan_unavailable",
            "search provider is not configured",
        ));
    };

    // Serve a recent snapshot instead of re-scanning inside the TTL window.
    if let (Some(keyword_id), false) = (request.keyword_id, request.force) {
        let cached = aivis_db::get_recent_snapshot(
            &state.pool,
            keyword_id,
            &request.domain,
            state.config.snapshot_cache_ttl_hours,
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

        if let Some(row) = cached {
            tracing::debug!(keyword_id, "serving cached snapshot");
            return Ok(Json(ApiResponse {
                data: ScanResponseData {
                    snapshot: super::snapshots::row_to_measurement(&request.keyword, &row),
                    snapshot_id: Some(row.id),
                    persisted: true,
                    cached: true,
                },
                meta: ResponseMeta::new(req_id.0),
            }));
        }
    }

    let spec = KeywordSpec {
        id: request.keyword_id.unwrap_or(0),
        term: request.keyword.clone(),
        location: request
            .location
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
    };

    let snapshot = executor
        .scan_one(&spec, &request.domain)
        .await
        .map_err(|e| map_scan_error(req_id.0.clone(), &e))?;

    let (snapshot_id, persisted) = match request.keyword_id {
        Some(keyword_id) => persist_and_enrich(&state, keyword_id, &snapshot).await,
        // Ad-hoc scans with no stored keyword are compute-only.
        None => (None, false),
    };

    Ok(Json(ApiResponse {
        data: ScanResponseData {
            snapshot,
            snapshot_id,
            persisted,
            cached: false,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn scan_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<BatchScanRequest>,
) -> Result<Json<ApiResponse<BatchScanResponseData>>, ApiError> {
    let Some(executor) = state.executor.clone() else {
        return Err(ApiError::new(
            req_id.0,
            "scan_unavailable",
            "search provider is not configured",
        ));
    };

    let (specs, domain) = resolve_batch_input(&state, &req_id.0, &request).await?;

    if specs.is_empty() {
        return Ok(Json(ApiResponse {
            data: BatchScanResponseData {
                total: 0,
                results: Vec::new(),
            },
            meta: ResponseMeta::new(req_id.0),
        }));
    }

    let scheduler = BatchScheduler::new(
        request.window.unwrap_or(state.config.scan_window_size),
        std::time::Duration::from_millis(state.config.scan_inter_window_delay_ms),
    );

    let snapshots = scheduler
        .run(executor.as_ref(), &specs, &domain, None)
        .await;

    let mut results = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        let (snapshot_id, persisted) =
            persist_and_enrich(&state, snapshot.keyword_id, &snapshot).await;
        results.push(BatchEntry {
            snapshot,
            snapshot_id,
            persisted,
        });
    }

    Ok(Json(ApiResponse {
        data: BatchScanResponseData {
            total: results.len(),
            results,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Resolves the batch request into concrete keyword specs plus the domain to
/// rank against: explicit keyword ids, or every active keyword of a project.
async fn resolve_batch_input(
    state: &AppState,
    request_id: &str,
    request: &BatchScanRequest,
) -> Result<(Vec<KeywordSpec>, String), ApiError> {
    let location = request
        .location
        .clone()
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    if let Some(keyword_ids) = &request.keyword_ids {
        let Some(domain) = request.domain.clone() else {
            return Err(ApiError::new(
                request_id,
                "validation_error",
                "domain is required when scanning explicit keyword ids",
            ));
        };

        let mut specs = Vec::with_capacity(keyword_ids.len());
        for &keyword_id in keyword_ids {
            let row = aivis_db::get_keyword(&state.pool, keyword_id)
                .await
                .map_err(|e| map_db_error(request_id.to_string(), &e))?
                .ok_or_else(|| {
                    ApiError::new(
                        request_id,
                        "not_found",
                        format!("keyword {keyword_id} does not exist"),
                    )
                })?;
            specs.push(KeywordSpec {
                id: row.id,
                term: row.term,
                location: location.clone(),
            });
        }
        return Ok((specs, domain));
    }

    let Some(project_id) = request.project_id else {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "either keyword_ids or project_id is required",
        ));
    };

    let projects = aivis_db::list_projects(&state.pool)
        .await
        .map_err(|e| map_db_error(request_id.to_string(), &e))?;
    let project = projects
        .into_iter()
        .find(|p| p.id == project_id)
        .ok_or_else(|| {
            ApiError::new(
                request_id,
                "not_found",
                format!("project {project_id} does not exist"),
            )
        })?;

    let keywords = aivis_db::list_keywords(&state.pool, project.id, true)
        .await
        .map_err(|e| map_db_error(request_id.to_string(), &e))?;

    let specs = keywords
        .into_iter()
        .map(|row| KeywordSpec {
            id: row.id,
            term: row.term,
            location: row.location,
        })
        .collect();

    let domain = request.domain.clone().unwrap_or(project.domain);
    Ok((specs, domain))
}
