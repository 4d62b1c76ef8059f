//! Job posting handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use solo_models::{DeleteResult, InsertOneResult, Job, JobFilter, UpdateResult};

use crate::error::ApiResult;
use crate::state::AppState;

/// Query parameters for the filtered listing.
#[derive(Debug, Default, Deserialize)]
pub struct JobFilterQuery {
    /// Category, matched exactly
    #[serde(default)]
    pub filter: Option<String>,
    /// Title text, matched case-insensitively anywhere in the title
    #[serde(default)]
    pub search: Option<String>,
    /// `asc` for earliest deadline first, anything else for latest first
    #[serde(default)]
    pub sort: Option<String>,
}

impl From<JobFilterQuery> for JobFilter {
    fn from(query: JobFilterQuery) -> Self {
        JobFilter::from_query(query.filter, query.search, query.sort)
    }
}

/// List every job.
pub async fn list_all_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    Ok(Json(state.store.jobs.list_all().await?))
}

/// List jobs by category and title, optionally ordered by deadline.
pub async fn filter_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobFilterQuery>,
) -> ApiResult<Json<Vec<Job>>> {
    let filter = JobFilter::from(query);
    debug!(?filter, "Filtering jobs");
    Ok(Json(state.store.jobs.list_filtered(&filter).await?))
}

/// List the jobs a buyer has posted.
pub async fn list_jobs_by_buyer(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Job>>> {
    Ok(Json(state.store.jobs.list_by_buyer_email(&email).await?))
}

/// Fetch one job; a missing job is `null`, not 404.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<Job>>> {
    Ok(Json(state.store.jobs.get_by_id(&id).await?))
}

pub async fn add_job(
    State(state): State<AppState>,
    Json(job): Json<Job>,
) -> ApiResult<Json<InsertOneResult>> {
    Ok(Json(state.store.jobs.create(job).await?))
}

/// Set the submitted fields on a job, creating it at `id` if absent.
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(job): Json<Job>,
) -> ApiResult<Json<UpdateResult>> {
    Ok(Json(state.store.jobs.upsert(&id, job).await?))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    Ok(Json(state.store.jobs.delete(&id).await?))
}
