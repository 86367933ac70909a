//! Axum route handlers for the Profile API.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::auth::Caller;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::profile::{ProfileRequest, ProfileRow};
use crate::profile::service::{delete_profile, get_profile, upsert_profile, WriteMode};
use crate::state::AppState;

fn created_or_ok((row, created): (ProfileRow, bool)) -> (StatusCode, Json<ProfileRow>) {
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(row))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ProfileRow>, AppError> {
    Ok(Json(get_profile(state.store.as_ref(), &caller).await?))
}

/// POST /api/v1/profile
///
/// Create-or-merge: blank and null values never overwrite what is stored.
pub async fn handle_post_profile(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> Result<(StatusCode, Json<ProfileRow>), AppError> {
    let result = upsert_profile(state.store.as_ref(), &caller, req, WriteMode::Merge).await?;
    Ok(created_or_ok(result))
}

/// PUT /api/v1/profile
///
/// Create-or-update: omitted keys are kept, explicit null or "" clears.
pub async fn handle_put_profile(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> Result<(StatusCode, Json<ProfileRow>), AppError> {
    let result = upsert_profile(state.store.as_ref(), &caller, req, WriteMode::Replace).await?;
    Ok(created_or_ok(result))
}

/// DELETE /api/v1/profile
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Value>, AppError> {
    let deleted = delete_profile(state.store.as_ref(), &caller).await?;
    Ok(Json(json!({
        "message": "User profile deleted successfully",
        "deletedProfile": deleted,
    })))
}
