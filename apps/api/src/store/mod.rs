//! Persistence seam. Every method takes the caller's `user_id` and scopes both
//! reads and writes by it; a row owned by someone else behaves as if absent.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::application::{
    ApplicationFilter, ApplicationRow, ApplicationStatus, NewApplication,
};
use crate::models::job::{JobChanges, JobFilter, JobRow, NewJob};
use crate::models::profile::{ProfileChanges, ProfileRow};
use crate::models::resume::{NewResume, ResumeChanges, ResumeRow};
use crate::validation::ListQuery;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn list_resumes(&self, user_id: &str, query: &ListQuery<()>) -> Result<Vec<ResumeRow>>;
    async fn get_resume(&self, user_id: &str, id: i64) -> Result<Option<ResumeRow>>;
    async fn insert_resume(&self, user_id: &str, resume: NewResume) -> Result<ResumeRow>;
    async fn update_resume(
        &self,
        user_id: &str,
        id: i64,
        changes: ResumeChanges,
    ) -> Result<Option<ResumeRow>>;
    async fn delete_resume(&self, user_id: &str, id: i64) -> Result<Option<ResumeRow>>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn list_jobs(&self, user_id: &str, query: &ListQuery<JobFilter>) -> Result<Vec<JobRow>>;
    async fn get_job(&self, user_id: &str, id: i64) -> Result<Option<JobRow>>;
    /// Inserts the whole batch or nothing.
    async fn insert_jobs(&self, user_id: &str, jobs: Vec<NewJob>) -> Result<Vec<JobRow>>;
    async fn update_job(&self, user_id: &str, id: i64, changes: JobChanges)
        -> Result<Option<JobRow>>;
    async fn delete_job(&self, user_id: &str, id: i64) -> Result<Option<JobRow>>;
}

/// Grouped counts over one user's applications.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyCount {
    pub company: String,
    pub count: i64,
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn list_applications(
        &self,
        user_id: &str,
        query: &ListQuery<ApplicationFilter>,
    ) -> Result<Vec<ApplicationRow>>;
    async fn get_application(&self, user_id: &str, id: i64) -> Result<Option<ApplicationRow>>;
    /// Inserts only when `application.job_id` names a job owned by `user_id`;
    /// `None` otherwise.
    async fn insert_application(
        &self,
        user_id: &str,
        application: NewApplication,
    ) -> Result<Option<ApplicationRow>>;
    async fn update_application_status(
        &self,
        user_id: &str,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>>;
    async fn delete_application(&self, user_id: &str, id: i64) -> Result<Option<ApplicationRow>>;

    async fn count_applications(&self, user_id: &str) -> Result<i64>;
    async fn count_by_status(&self, user_id: &str) -> Result<Vec<StatusCount>>;
    async fn count_created_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<i64>;
    /// Non-empty companies only, most applications first, ties by name.
    async fn count_by_company(&self, user_id: &str) -> Result<Vec<CompanyCount>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRow>>;
    /// Creates the caller's single profile or updates it in place.
    /// Returns the row and whether it was created.
    async fn upsert_profile(
        &self,
        user_id: &str,
        changes: ProfileChanges,
    ) -> Result<(ProfileRow, bool)>;
    async fn delete_profile(&self, user_id: &str) -> Result<Option<ProfileRow>>;
}

/// Everything the API persists. Carried in `AppState` as `Arc<dyn Store>`.
pub trait Store: ResumeStore + JobStore + ApplicationStore + ProfileStore {}

impl<T> Store for T where T: ResumeStore + JobStore + ApplicationStore + ProfileStore {}
