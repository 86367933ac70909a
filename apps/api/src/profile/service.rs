//! The caller's single profile. Writes are upserts: the first write creates
//! the row, later writes merge into it.

use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::field::Field;
use crate::models::profile::{ProfileChanges, ProfileRequest, ProfileRow};
use crate::store::ProfileStore;
use crate::validation::is_valid_email;

/// How a write treats `null` and blank values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: only non-blank values are written; everything else keeps the prior value.
    Merge,
    /// PUT: omitted keys keep the prior value, `null` or blank clears it.
    Replace,
}

fn normalise(field: Field<String>, mode: WriteMode) -> Field<String> {
    let trimmed = field.map(|v| v.trim().to_string());
    match (mode, trimmed) {
        (_, Field::Value(v)) if !v.is_empty() => Field::Value(v),
        (WriteMode::Merge, _) => Field::Absent,
        (WriteMode::Replace, Field::Absent) => Field::Absent,
        (WriteMode::Replace, _) => Field::Null,
    }
}

pub fn validate_profile(req: ProfileRequest, mode: WriteMode) -> Result<ProfileChanges, AppError> {
    let changes = ProfileChanges {
        email: normalise(req.email, mode),
        phone: normalise(req.phone, mode),
        linkedin: normalise(req.linkedin, mode),
        cover_letter: normalise(req.cover_letter, mode),
    };
    if let Some(email) = changes.email.as_value() {
        if !is_valid_email(email) {
            return Err(AppError::InvalidEmail);
        }
    }
    Ok(changes)
}

pub async fn get_profile<S: ProfileStore + ?Sized>(
    store: &S,
    caller: &Caller,
) -> Result<ProfileRow, AppError> {
    store
        .get_profile(&caller.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
}

/// Returns the stored profile and whether this call created it.
pub async fn upsert_profile<S: ProfileStore + ?Sized>(
    store: &S,
    caller: &Caller,
    req: ProfileRequest,
    mode: WriteMode,
) -> Result<(ProfileRow, bool), AppError> {
    let changes = validate_profile(req, mode)?;
    let (row, created) = store.upsert_profile(&caller.user_id, changes).await?;
    if created {
        info!("Created profile for user {}", caller.user_id);
    } else {
        info!("Updated profile for user {}", caller.user_id);
    }
    Ok((row, created))
}

pub async fn delete_profile<S: ProfileStore + ?Sized>(
    store: &S,
    caller: &Caller,
) -> Result<ProfileRow, AppError> {
    let row = store
        .delete_profile(&caller.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;
    info!("Deleted profile for user {}", caller.user_id);
    Ok(row)
}
