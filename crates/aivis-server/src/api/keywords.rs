//! Project and keyword management endpoints.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ProjectItem {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub domain: String,
    pub target_location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct KeywordItem {
    pub id: i64,
    pub public_id: Uuid,
    pub project_id: i64,
    pub term: String,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListKeywordsQuery {
    pub project_id: i64,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateKeywordRequest {
    pub project_id: i64,
    pub term: String,
    pub location: Option<String>,
}

pub(super) async fn list_projects(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProjectItem>>>, ApiError> {
    let rows = aivis_db::list_projects(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| ProjectItem {
            id: row.id,
            public_id: row.public_id,
            name: row.name,
            domain: row.domain,
            target_location: row.target_location,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListKeywordsQuery>,
) -> Result<Json<ApiResponse<Vec<KeywordItem>>>, ApiError> {
    let rows = aivis_db::list_keywords(&state.pool, query.project_id, !query.include_inactive)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(keyword_item).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_keyword(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<CreateKeywordRequest>,
) -> Result<Json<ApiResponse<KeywordItem>>, ApiError> {
    let term = request.term.trim();
    if term.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "keyword term must be non-empty",
        ));
    }

    let location = request
        .location
        .unwrap_or_else(|| "United States".to_string());

    let row = aivis_db::insert_keyword(&state.pool, request.project_id, term, &location)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: keyword_item(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Soft delete: the keyword drops out of future batch inputs while its
/// snapshot history stays queryable.
pub(super) async fn deactivate_keyword(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(keyword_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    aivis_db::deactivate_keyword(&state.pool, keyword_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deactivated": keyword_id }),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn keyword_item(row: aivis_db::KeywordRow) -> KeywordItem {
    KeywordItem {
        id: row.id,
        public_id: row.public_id,
        project_id: row.project_id,
        term: row.term,
        location: row.location,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}
