use serde_json::Value;
use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::job::{CreateJobRequest, JobChanges, JobFilter, JobRow, NewJob, UpdateJobRequest};
use crate::store::JobStore;
use crate::validation::{
    list_query, non_empty, optional_text_change, required_text, required_text_change, ListParams,
};

pub const JOB_SORTS: &[(&str, &'static str)] = &[
    ("id", "id"),
    ("createdAt", "created_at"),
    ("title", "title"),
    ("company", "company"),
    ("location", "location"),
    ("type", "type"),
    ("posted", "posted"),
];

fn not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

fn normalise_website(website: String) -> String {
    website.to_lowercase()
}

pub async fn list_jobs<S: JobStore + ?Sized>(
    store: &S,
    caller: &Caller,
    params: &ListParams,
) -> Result<Vec<JobRow>, AppError> {
    let filter = JobFilter {
        location: non_empty(params.location.clone()),
        job_type: non_empty(params.job_type.clone()),
    };
    let query = list_query(params, JOB_SORTS, filter)?;
    Ok(store.list_jobs(&caller.user_id, &query).await?)
}

pub async fn get_job<S: JobStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
) -> Result<JobRow, AppError> {
    store.get_job(&caller.user_id, id).await?.ok_or_else(not_found)
}

pub fn validate_new_job(req: CreateJobRequest) -> Result<NewJob, AppError> {
    Ok(NewJob {
        title: required_text(req.title, "title")?,
        company: required_text(req.company, "company")?,
        location: non_empty(req.location),
        salary: non_empty(req.salary),
        job_type: non_empty(req.job_type),
        description: non_empty(req.description),
        skills: req.skills,
        website: non_empty(req.website).map(normalise_website),
        posted: non_empty(req.posted),
    })
}

/// Decodes raw batch entries one by one so a malformed entry is named by its index.
pub fn parse_batch(entries: Vec<Value>) -> Result<Vec<CreateJobRequest>, AppError> {
    if entries.is_empty() {
        return Err(AppError::EmptyBatch);
    }
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<CreateJobRequest>(entry)
                .map_err(|e| AppError::InvalidField(format!("Job at index {index}: {e}")))
        })
        .collect()
}

/// Validates every entry before anything is written; the first invalid entry
/// rejects the whole batch and is named by its index.
pub fn validate_batch(jobs: Vec<CreateJobRequest>) -> Result<Vec<NewJob>, AppError> {
    if jobs.is_empty() {
        return Err(AppError::EmptyBatch);
    }
    jobs.into_iter()
        .enumerate()
        .map(|(index, job)| {
            validate_new_job(job).map_err(|e| match e {
                AppError::MissingRequiredField(msg) => {
                    AppError::MissingRequiredField(format!("Job at index {index}: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

pub async fn create_jobs<S: JobStore + ?Sized>(
    store: &S,
    caller: &Caller,
    jobs: Vec<CreateJobRequest>,
) -> Result<Vec<JobRow>, AppError> {
    let jobs = validate_batch(jobs)?;
    let rows = store.insert_jobs(&caller.user_id, jobs).await?;
    info!("Created {} job(s) for user {}", rows.len(), caller.user_id);
    Ok(rows)
}

pub fn validate_job_changes(req: UpdateJobRequest) -> Result<JobChanges, AppError> {
    Ok(JobChanges {
        title: required_text_change(req.title, "title")?,
        company: required_text_change(req.company, "company")?,
        location: optional_text_change(req.location),
        salary: optional_text_change(req.salary),
        job_type: optional_text_change(req.job_type),
        description: optional_text_change(req.description),
        skills: req.skills,
        website: optional_text_change(req.website).map(normalise_website),
        posted: optional_text_change(req.posted),
    })
}

pub async fn update_job<S: JobStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
    req: UpdateJobRequest,
) -> Result<JobRow, AppError> {
    get_job(store, caller, id).await?;
    let changes = validate_job_changes(req)?;
    let row = store
        .update_job(&caller.user_id, id, changes)
        .await?
        .ok_or_else(not_found)?;
    info!("Updated job {id} for user {}", caller.user_id);
    Ok(row)
}

pub async fn delete_job<S: JobStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
) -> Result<JobRow, AppError> {
    let row = store
        .delete_job(&caller.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    info!("Deleted job {id} for user {}", caller.user_id);
    Ok(row)
}
