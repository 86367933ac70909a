//! Axum route handlers for the Applications API.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::applications::service::{
    create_application, delete_application, get_application, list_applications,
    update_application_status,
};
use crate::applications::stats::{compute_stats, ApplicationStats};
use crate::applications::submitter::submit_application;
use crate::auth::Caller;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::application::{
    ApplicationRow, CreateApplicationRequest, StatusUpdateRequest, SubmitApplicationRequest,
};
use crate::state::AppState;
use crate::validation::{parse_id, IdParams, ListParams};

/// GET /api/v1/applications
///
/// Lists the caller's applications (`search`, `status`, `sort`, `order`), or
/// returns one when `?id=` is given.
pub async fn handle_get_applications(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Response, AppError> {
    if let Some(raw) = params.id.as_deref() {
        let id = parse_id(Some(raw))?;
        let application = get_application(state.store.as_ref(), &caller, id).await?;
        return Ok(Json(application).into_response());
    }
    let applications = list_applications(state.store.as_ref(), &caller, &params).await?;
    Ok(Json(applications).into_response())
}

/// POST /api/v1/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let application = create_application(state.store.as_ref(), &caller, req).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// PATCH /api/v1/applications?id=
///
/// Accepts exactly `{"status": ...}`.
pub async fn handle_update_application(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<IdParams>,
    ApiJson(req): ApiJson<StatusUpdateRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let id = parse_id(params.id.as_deref())?;
    let application = update_application_status(state.store.as_ref(), &caller, id, req).await?;
    Ok(Json(application))
}

/// DELETE /api/v1/applications?id=
pub async fn handle_delete_application(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<IdParams>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(params.id.as_deref())?;
    let deleted = delete_application(state.store.as_ref(), &caller, id).await?;
    Ok(Json(json!({
        "message": "Application deleted successfully",
        "deletedApplication": deleted,
    })))
}

/// POST /api/v1/applications/submit
pub async fn handle_submit_application(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<SubmitApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let application = submit_application(
        state.store.as_ref(),
        state.submitter.as_ref(),
        &caller,
        req,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications/stats
pub async fn handle_application_stats(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ApplicationStats>, AppError> {
    let stats = compute_stats(state.store.as_ref(), &caller, Utc::now()).await?;
    Ok(Json(stats))
}
