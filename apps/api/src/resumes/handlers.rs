//! Axum route handlers for the Resume API.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Caller;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::resume::{CreateResumeRequest, ResumeRow, UpdateResumeRequest};
use crate::resumes::service::{
    create_resume, delete_resume, get_resume, list_resumes, update_resume,
};
use crate::resumes::skills::extract_skills;
use crate::state::AppState;
use crate::validation::{parse_id, IdParams, ListParams};

#[derive(Debug, Deserialize)]
pub struct SkillsRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

/// GET /api/v1/resumes
///
/// Lists the caller's résumés, or returns a single one when `?id=` is given.
pub async fn handle_get_resumes(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Response, AppError> {
    if let Some(raw) = params.id.as_deref() {
        let id = parse_id(Some(raw))?;
        let resume = get_resume(state.store.as_ref(), &caller, id).await?;
        return Ok(Json(resume).into_response());
    }
    let resumes = list_resumes(state.store.as_ref(), &caller, &params).await?;
    Ok(Json(resumes).into_response())
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let resume = create_resume(state.store.as_ref(), &caller, req).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// PUT /api/v1/resumes?id=
pub async fn handle_update_resume(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<IdParams>,
    ApiJson(req): ApiJson<UpdateResumeRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    let id = parse_id(params.id.as_deref())?;
    let resume = update_resume(state.store.as_ref(), &caller, id, req).await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes?id=
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<IdParams>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(params.id.as_deref())?;
    let deleted = delete_resume(state.store.as_ref(), &caller, id).await?;
    Ok(Json(json!({
        "message": "Resume deleted successfully",
        "deletedResume": deleted,
    })))
}

/// POST /api/v1/resumes/skills
///
/// Previews keyword skill extraction without storing anything.
pub async fn handle_extract_skills(
    _caller: Caller,
    ApiJson(req): ApiJson<SkillsRequest>,
) -> Json<SkillsResponse> {
    Json(SkillsResponse {
        skills: extract_skills(&req.text),
    })
}
