//! Database operations for the `projects` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `projects` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub domain: String,
    pub target_location: String,
    pub created_at: DateTime<Utc>,
}

const PROJECT_COLUMNS: &str = "id, public_id, name, domain, target_location, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all projects, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_projects(pool: &PgPool) -> Result<Vec<ProjectRow>, DbError> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single project by tracked domain, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_project_by_domain(
    pool: &PgPool,
    domain: &str,
) -> Result<Option<ProjectRow>, DbError> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE domain = $1"
    ))
    .bind(domain)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the project for `domain`, inserting it first if it does not exist.
///
/// The upsert is a no-op on conflict so concurrent callers converge on the
/// same row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails, or [`DbError::NotFound`]
/// if the row vanishes between insert and select (concurrent hard delete).
pub async fn get_or_create_project(
    pool: &PgPool,
    name: &str,
    domain: &str,
    target_location: &str,
) -> Result<ProjectRow, DbError> {
    sqlx::query(
        "INSERT INTO projects (name, domain, target_location) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (domain) DO NOTHING",
    )
    .bind(name)
    .bind(domain)
    .bind(target_location)
    .execute(pool)
    .await?;

    get_project_by_domain(pool, domain)
        .await?
        .ok_or(DbError::NotFound)
}
