//! Manual analysis trigger.
//!
//! Enrichment normally fires automatically after a scan persists a cited
//! snapshot; this endpoint re-runs it on demand — the UI's "retry analysis"
//! path and the recovery route when a fire-and-forget run failed.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use aivis_analysis::{Analysis, AnalysisError, AssessmentRequest};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub snapshot_id: i64,
    /// Text to assess; defaults to the snapshot's captured snippet.
    pub text: Option<String>,
    pub keyword: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeResponseData {
    pub snapshot_id: i64,
    pub analysis: Analysis,
}

pub(super) async fn analyze_snapshot(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeResponseData>>, ApiError> {
    let Some(enricher) = state.enricher.clone() else {
        return Err(ApiError::new(
            req_id.0,
            "analysis_unavailable",
            "assessment engine is not configured",
        ));
    };

    let snapshot = aivis_db::get_snapshot(&state.pool, request.snapshot_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("snapshot {} does not exist", request.snapshot_id),
            )
        })?;

    let text = request
        .text
        .or_else(|| snapshot.ai_overview_snippet.clone())
        .or_else(|| snapshot.ai_mode_snippet.clone())
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                "no captured text available to analyze",
            )
        })?;

    let keyword = match request.keyword {
        Some(keyword) => keyword,
        None => aivis_db::get_keyword(&state.pool, snapshot.keyword_id)
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?
            .map(|k| k.term)
            .unwrap_or_default(),
    };

    let assessment = AssessmentRequest {
        keyword,
        domain: request.domain.unwrap_or_else(|| snapshot.domain.clone()),
        text,
    };

    let analysis = enricher
        .enrich(snapshot.id, &assessment)
        .await
        .map_err(|e| map_analysis_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: AnalyzeResponseData {
            snapshot_id: snapshot.id,
            analysis,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_analysis_error(request_id: String, error: &AnalysisError) -> ApiError {
    tracing::warn!(error = %error, "manual analysis failed");
    match error {
        AnalysisError::Persist(e) => map_db_error(request_id, e),
        _ => ApiError::new(
            request_id,
            "analysis_failed",
            "assessment engine did not return a usable analysis",
        ),
    }
}
