//! Axum route handlers for the Jobs API.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::auth::Caller;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::jobs::search::{search_and_save, JobSearchRequest};
use crate::jobs::service::{
    create_jobs, delete_job, get_job, list_jobs, parse_batch, update_job,
};
use crate::models::job::{JobBatch, JobRow, UpdateJobRequest};
use crate::state::AppState;
use crate::validation::{parse_id, IdParams, ListParams};

/// GET /api/v1/jobs
///
/// Lists the caller's jobs (`search`, `location`, `type` filters), or returns
/// one job when `?id=` is given.
pub async fn handle_get_jobs(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Response, AppError> {
    if let Some(raw) = params.id.as_deref() {
        let id = parse_id(Some(raw))?;
        let job = get_job(state.store.as_ref(), &caller, id).await?;
        return Ok(Json(job).into_response());
    }
    let jobs = list_jobs(state.store.as_ref(), &caller, &params).await?;
    Ok(Json(jobs).into_response())
}

/// POST /api/v1/jobs
///
/// Accepts one job or an array. Always responds with the array of created rows.
pub async fn handle_create_jobs(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(batch): ApiJson<JobBatch>,
) -> Result<(StatusCode, Json<Vec<JobRow>>), AppError> {
    let requests = parse_batch(batch.into_vec())?;
    let jobs = create_jobs(state.store.as_ref(), &caller, requests).await?;
    Ok((StatusCode::CREATED, Json(jobs)))
}

/// PUT /api/v1/jobs?id=
pub async fn handle_update_job(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<IdParams>,
    ApiJson(req): ApiJson<UpdateJobRequest>,
) -> Result<Json<JobRow>, AppError> {
    let id = parse_id(params.id.as_deref())?;
    let job = update_job(state.store.as_ref(), &caller, id, req).await?;
    Ok(Json(job))
}

/// DELETE /api/v1/jobs?id=
pub async fn handle_delete_job(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<IdParams>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(params.id.as_deref())?;
    let deleted = delete_job(state.store.as_ref(), &caller, id).await?;
    Ok(Json(json!({
        "message": "Job deleted successfully",
        "deletedJob": deleted,
    })))
}

/// POST /api/v1/jobs/search
///
/// Runs the configured search provider and saves the matches for the caller.
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<JobSearchRequest>,
) -> Result<(StatusCode, Json<Vec<JobRow>>), AppError> {
    let jobs = search_and_save(state.store.as_ref(), state.job_search.as_ref(), &caller, req).await?;
    let status = if jobs.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(jobs)))
}
