//! Application submission collaborator.
//!
//! A real implementation would hand the application to the job board; the
//! outcome it reports is what gets recorded. `RecordOnlySubmitter` submits
//! nothing and records every application as pending.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::applications::service::insert_application;
use crate::auth::Caller;
use crate::errors::AppError;
use crate::jobs::service::get_job;
use crate::models::application::{
    ApplicationRow, ApplicationStatus, NewApplication, SubmitApplicationRequest,
};
use crate::models::job::JobRow;
use crate::store::{ApplicationStore, JobStore};

#[async_trait]
pub trait ApplicationSubmitter: Send + Sync {
    async fn submit(&self, job: &JobRow) -> Result<ApplicationStatus>;
}

pub struct RecordOnlySubmitter;

#[async_trait]
impl ApplicationSubmitter for RecordOnlySubmitter {
    async fn submit(&self, _job: &JobRow) -> Result<ApplicationStatus> {
        Ok(ApplicationStatus::Pending)
    }
}

/// Submits an application for one of the caller's jobs and records the outcome,
/// copying title, company and website from the job.
pub async fn submit_application<S>(
    store: &S,
    submitter: &dyn ApplicationSubmitter,
    caller: &Caller,
    req: SubmitApplicationRequest,
) -> Result<ApplicationRow, AppError>
where
    S: JobStore + ApplicationStore + ?Sized,
{
    let job_id = req
        .job_id
        .ok_or_else(|| AppError::MissingRequiredField("jobId is required".to_string()))?;
    let job = match get_job(store, caller, job_id).await {
        Ok(job) => job,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::InvalidForeignKey(
                "Referenced job does not exist or does not belong to user".to_string(),
            ))
        }
        Err(e) => return Err(e),
    };

    let status = submitter.submit(&job).await?;
    insert_application(
        store,
        caller,
        NewApplication {
            job_id: job.id,
            job_title: Some(job.title),
            company: Some(job.company),
            status,
            applied_at: Some(Utc::now().to_rfc3339()),
            website: job.website,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::service::create_jobs;
    use crate::models::job::CreateJobRequest;
    use crate::store::MemoryStore;

    struct AlwaysFails;

    #[async_trait]
    impl ApplicationSubmitter for AlwaysFails {
        async fn submit(&self, _job: &JobRow) -> Result<ApplicationStatus> {
            Ok(ApplicationStatus::Failed)
        }
    }

    fn caller(id: &str) -> Caller {
        Caller {
            user_id: id.to_string(),
        }
    }

    async fn seed_job(store: &MemoryStore, owner: &Caller) -> i64 {
        create_jobs(
            store,
            owner,
            vec![CreateJobRequest {
                title: Some("Backend Developer".into()),
                company: Some("Wipro".into()),
                website: Some("indeed.com".into()),
                ..Default::default()
            }],
        )
        .await
        .unwrap()[0]
            .id
    }

    #[tokio::test]
    async fn test_submission_copies_job_details() {
        let store = MemoryStore::new();
        let alice = caller("alice");
        let job_id = seed_job(&store, &alice).await;
        let row = submit_application(
            &store,
            &RecordOnlySubmitter,
            &alice,
            SubmitApplicationRequest {
                job_id: Some(job_id),
            },
        )
        .await
        .unwrap();
        assert_eq!(row.status, ApplicationStatus::Pending);
        assert_eq!(row.job_title.as_deref(), Some("Backend Developer"));
        assert_eq!(row.company.as_deref(), Some("Wipro"));
        assert_eq!(row.website.as_deref(), Some("indeed.com"));
        assert!(row.applied_at.is_some());
    }

    #[tokio::test]
    async fn test_outcome_comes_from_submitter() {
        let store = MemoryStore::new();
        let alice = caller("alice");
        let job_id = seed_job(&store, &alice).await;
        let row = submit_application(
            &store,
            &AlwaysFails,
            &alice,
            SubmitApplicationRequest {
                job_id: Some(job_id),
            },
        )
        .await
        .unwrap();
        assert_eq!(row.status, ApplicationStatus::Failed);
    }

    #[tokio::test]
    async fn test_foreign_job_rejected() {
        let store = MemoryStore::new();
        let job_id = seed_job(&store, &caller("alice")).await;
        let err = submit_application(
            &store,
            &RecordOnlySubmitter,
            &caller("bob"),
            SubmitApplicationRequest {
                job_id: Some(job_id),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_FOREIGN_KEY");
    }
}
