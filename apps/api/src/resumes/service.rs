use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::field::Field;
use crate::models::resume::{
    CreateResumeRequest, NewResume, ResumeChanges, ResumeRow, UpdateResumeRequest,
};
use crate::resumes::skills::extract_skills;
use crate::store::ResumeStore;
use crate::validation::{
    list_query, non_empty, optional_text_change, required_text, required_text_change,
    ListParams,
};

/// Public sort names and their columns.
pub const RESUME_SORTS: &[(&str, &'static str)] = &[
    ("id", "id"),
    ("createdAt", "created_at"),
    ("fileName", "file_name"),
    ("fileSize", "file_size"),
    ("fileType", "file_type"),
];

fn not_found() -> AppError {
    AppError::NotFound("Resume not found".to_string())
}

fn validate_file_size(size: i64) -> Result<i64, AppError> {
    if size < 0 {
        return Err(AppError::InvalidField(
            "fileSize must be a non-negative integer".to_string(),
        ));
    }
    Ok(size)
}

pub async fn list_resumes<S: ResumeStore + ?Sized>(
    store: &S,
    caller: &Caller,
    params: &ListParams,
) -> Result<Vec<ResumeRow>, AppError> {
    let query = list_query(params, RESUME_SORTS, ())?;
    Ok(store.list_resumes(&caller.user_id, &query).await?)
}

pub async fn get_resume<S: ResumeStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
) -> Result<ResumeRow, AppError> {
    store
        .get_resume(&caller.user_id, id)
        .await?
        .ok_or_else(not_found)
}

/// Validates and normalises a create body. When `skills` is omitted they are
/// derived from `resumeText`.
pub fn validate_new_resume(req: CreateResumeRequest) -> Result<NewResume, AppError> {
    let file_name = required_text(req.file_name, "fileName")?;
    let resume_text = non_empty(req.resume_text);
    let skills = match req.skills {
        Some(skills) => skills,
        None => resume_text.as_deref().map(extract_skills).unwrap_or_default(),
    };
    let file_size = req.file_size.map(validate_file_size).transpose()?;
    Ok(NewResume {
        resume_text,
        skills,
        file_name,
        file_size,
        file_type: non_empty(req.file_type),
    })
}

pub async fn create_resume<S: ResumeStore + ?Sized>(
    store: &S,
    caller: &Caller,
    req: CreateResumeRequest,
) -> Result<ResumeRow, AppError> {
    let resume = validate_new_resume(req)?;
    let row = store.insert_resume(&caller.user_id, resume).await?;
    info!(
        "Created resume {} ({}) for user {}",
        row.id, row.file_name, caller.user_id
    );
    Ok(row)
}

pub fn validate_resume_changes(req: UpdateResumeRequest) -> Result<ResumeChanges, AppError> {
    let file_name = required_text_change(req.file_name, "fileName")?;
    let file_size = match req.file_size {
        Field::Value(size) => Field::Value(validate_file_size(size)?),
        other => other,
    };
    Ok(ResumeChanges {
        resume_text: optional_text_change(req.resume_text),
        skills: req.skills,
        file_name,
        file_size,
        file_type: optional_text_change(req.file_type),
    })
}

pub async fn update_resume<S: ResumeStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
    req: UpdateResumeRequest,
) -> Result<ResumeRow, AppError> {
    // Existence first, so an unknown id is a 404 even for an invalid body.
    get_resume(store, caller, id).await?;
    let changes = validate_resume_changes(req)?;
    let row = store
        .update_resume(&caller.user_id, id, changes)
        .await?
        .ok_or_else(not_found)?;
    info!("Updated resume {id} for user {}", caller.user_id);
    Ok(row)
}

pub async fn delete_resume<S: ResumeStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
) -> Result<ResumeRow, AppError> {
    let row = store
        .delete_resume(&caller.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    info!("Deleted resume {id} for user {}", caller.user_id);
    Ok(row)
}
