use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::application::{
    ApplicationFilter, ApplicationRow, CreateApplicationRequest, NewApplication,
    StatusUpdateRequest,
};
use crate::models::field::Field;
use crate::store::ApplicationStore;
use crate::validation::{list_query, non_empty, parse_status, ListParams};

pub const APPLICATION_SORTS: &[(&str, &'static str)] = &[
    ("id", "id"),
    ("createdAt", "created_at"),
    ("jobId", "job_id"),
    ("jobTitle", "job_title"),
    ("company", "company"),
    ("status", "status"),
    ("appliedAt", "applied_at"),
];

fn not_found() -> AppError {
    AppError::NotFound("Application not found".to_string())
}

fn foreign_job() -> AppError {
    AppError::InvalidForeignKey(
        "Referenced job does not exist or does not belong to user".to_string(),
    )
}

pub async fn list_applications<S: ApplicationStore + ?Sized>(
    store: &S,
    caller: &Caller,
    params: &ListParams,
) -> Result<Vec<ApplicationRow>, AppError> {
    let status = non_empty(params.status.clone())
        .map(|s| parse_status(&s))
        .transpose()?;
    let query = list_query(params, APPLICATION_SORTS, ApplicationFilter { status })?;
    Ok(store.list_applications(&caller.user_id, &query).await?)
}

pub async fn get_application<S: ApplicationStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
) -> Result<ApplicationRow, AppError> {
    store
        .get_application(&caller.user_id, id)
        .await?
        .ok_or_else(not_found)
}

pub fn validate_new_application(req: CreateApplicationRequest) -> Result<NewApplication, AppError> {
    let job_id = req
        .job_id
        .filter(|id| *id != 0)
        .ok_or_else(|| AppError::MissingRequiredField("jobId is required".to_string()))?;
    let status = non_empty(req.status)
        .ok_or_else(|| AppError::MissingRequiredField("status is required".to_string()))?;
    let status = parse_status(&status)?;
    if job_id < 0 {
        return Err(foreign_job());
    }
    Ok(NewApplication {
        job_id,
        job_title: non_empty(req.job_title),
        company: non_empty(req.company),
        status,
        applied_at: non_empty(req.applied_at),
        website: non_empty(req.website),
    })
}

/// Persists an already validated application. The store only inserts when the
/// job belongs to the caller.
pub async fn insert_application<S: ApplicationStore + ?Sized>(
    store: &S,
    caller: &Caller,
    application: NewApplication,
) -> Result<ApplicationRow, AppError> {
    let job_id = application.job_id;
    let row = store
        .insert_application(&caller.user_id, application)
        .await?
        .ok_or_else(foreign_job)?;
    info!(
        "Recorded application {} ({}) for job {job_id}, user {}",
        row.id, row.status, caller.user_id
    );
    Ok(row)
}

pub async fn create_application<S: ApplicationStore + ?Sized>(
    store: &S,
    caller: &Caller,
    req: CreateApplicationRequest,
) -> Result<ApplicationRow, AppError> {
    let application = validate_new_application(req)?;
    insert_application(store, caller, application).await
}

/// Only `status` may change after creation.
pub async fn update_application_status<S: ApplicationStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
    req: StatusUpdateRequest,
) -> Result<ApplicationRow, AppError> {
    if !req.other.is_empty() || req.status.is_absent() {
        return Err(AppError::InvalidUpdateFields(
            "Only status field can be updated".to_string(),
        ));
    }
    let raw = match req.status {
        Field::Value(s) => non_empty(Some(s)),
        _ => None,
    }
    .ok_or_else(|| AppError::MissingRequiredField("status is required".to_string()))?;
    let status = parse_status(&raw)?;

    get_application(store, caller, id).await?;
    let row = store
        .update_application_status(&caller.user_id, id, status)
        .await?
        .ok_or_else(not_found)?;
    info!("Application {id} for user {} is now {status}", caller.user_id);
    Ok(row)
}

pub async fn delete_application<S: ApplicationStore + ?Sized>(
    store: &S,
    caller: &Caller,
    id: i64,
) -> Result<ApplicationRow, AppError> {
    let row = store
        .delete_application(&caller.user_id, id)
        .await?
        .ok_or_else(not_found)?;
    info!("Deleted application {id} for user {}", caller.user_id);
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::service::create_jobs;
    use crate::models::application::ApplicationStatus;
    use crate::models::job::CreateJobRequest;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn caller(id: &str) -> Caller {
        Caller {
            user_id: id.to_string(),
        }
    }

    async fn seed_job(store: &MemoryStore, owner: &Caller) -> i64 {
        let rows = create_jobs(
            store,
            owner,
            vec![CreateJobRequest {
                title: Some("Rust Engineer".into()),
                company: Some("Ferrous".into()),
                ..Default::default()
            }],
        )
        .await
        .unwrap();
        rows[0].id
    }

    fn apply(job_id: i64, status: &str) -> CreateApplicationRequest {
        CreateApplicationRequest {
            job_id: Some(job_id),
            status: Some(status.to_string()),
            company: Some("Ferrous".into()),
            ..Default::default()
        }
    }

    fn patch(body: serde_json::Value) -> StatusUpdateRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_missing_fields_are_named() {
        let err = validate_new_application(CreateApplicationRequest::default()).unwrap_err();
        assert_eq!(err.to_string(), "jobId is required");
        let err = validate_new_application(CreateApplicationRequest {
            job_id: Some(1),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "status is required");
    }

    #[test]
    fn test_zero_job_id_counts_as_missing() {
        let err = validate_new_application(apply(0, "pending")).unwrap_err();
        assert_eq!(err.code(), "MISSING_REQUIRED_FIELD");
        assert_eq!(err.to_string(), "jobId is required");
        let err = validate_new_application(apply(-2, "pending")).unwrap_err();
        assert_eq!(err.code(), "INVALID_FOREIGN_KEY");
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = validate_new_application(apply(1, "hired")).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS");
    }

    #[tokio::test]
    async fn test_create_sets_owner_and_status() {
        let store = MemoryStore::new();
        let alice = caller("alice");
        let job_id = seed_job(&store, &alice).await;
        let row = create_application(&store, &alice, apply(job_id, "pending"))
            .await
            .unwrap();
        assert_eq!(row.user_id, "alice");
        assert_eq!(row.job_id, Some(job_id));
        assert_eq!(row.status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_job_of_another_user_is_invalid_foreign_key() {
        let store = MemoryStore::new();
        let job_id = seed_job(&store, &caller("alice")).await;
        let err = create_application(&store, &caller("bob"), apply(job_id, "pending"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_FOREIGN_KEY");
        let err = create_application(&store, &caller("bob"), apply(9999, "pending"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_FOREIGN_KEY");
    }

    #[tokio::test]
    async fn test_status_only_updates() {
        let store = MemoryStore::new();
        let alice = caller("alice");
        let job_id = seed_job(&store, &alice).await;
        let row = create_application(&store, &alice, apply(job_id, "pending"))
            .await
            .unwrap();

        let updated =
            update_application_status(&store, &alice, row.id, patch(json!({"status": "success"})))
                .await
                .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Success);

        let err = update_application_status(
            &store,
            &alice,
            row.id,
            patch(json!({"status": "success", "website": "x"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_UPDATE_FIELDS");

        let err = update_application_status(&store, &alice, row.id, patch(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_UPDATE_FIELDS");

        let err =
            update_application_status(&store, &alice, row.id, patch(json!({"status": "bogus"})))
                .await
                .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS");

        let err = update_application_status(&store, &alice, row.id, patch(json!({"status": null})))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_REQUIRED_FIELD");
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let store = MemoryStore::new();
        let alice = caller("alice");
        let job_id = seed_job(&store, &alice).await;
        for status in ["success", "failed", "success"] {
            create_application(&store, &alice, apply(job_id, status))
                .await
                .unwrap();
        }
        let params = ListParams {
            status: Some("success".into()),
            ..Default::default()
        };
        let rows = list_applications(&store, &alice, &params).await.unwrap();
        assert_eq!(rows.len(), 2);

        let params = ListParams {
            status: Some("bogus".into()),
            ..Default::default()
        };
        assert!(list_applications(&store, &alice, &params).await.is_err());
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let store = MemoryStore::new();
        let alice = caller("alice");
        let job_id = seed_job(&store, &alice).await;
        let row = create_application(&store, &alice, apply(job_id, "failed"))
            .await
            .unwrap();
        delete_application(&store, &alice, row.id).await.unwrap();
        let err = delete_application(&store, &alice, row.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
