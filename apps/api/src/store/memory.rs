use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::application::{
    ApplicationFilter, ApplicationRow, ApplicationStatus, NewApplication,
};
use crate::models::job::{JobChanges, JobFilter, JobRow, NewJob};
use crate::models::profile::{ProfileChanges, ProfileRow};
use crate::models::resume::{NewResume, ResumeChanges, ResumeRow};
use crate::store::{
    ApplicationStore, CompanyCount, JobStore, ProfileStore, ResumeStore, StatusCount,
};
use crate::validation::{contains_ignore_case, ListQuery, SortOrder};

/// In-process store with the same ownership and ordering rules as `PgStore`.
/// Each trait method holds the table lock for its whole check-then-act.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    resumes: Vec<ResumeRow>,
    jobs: Vec<JobRow>,
    applications: Vec<ApplicationRow>,
    profiles: Vec<ProfileRow>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites an application's creation time.
    #[cfg(test)]
    pub async fn backdate_application(&self, id: i64, created_at: DateTime<Utc>) {
        let mut tables = self.tables.write().await;
        if let Some(row) = tables.applications.iter_mut().find(|a| a.id == id) {
            row.created_at = created_at;
        }
    }
}

/// A column value the list endpoints can sort on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Int(Option<i64>),
    Text(Option<String>),
    Time(DateTime<Utc>),
}

trait Listable: Clone {
    fn id(&self) -> i64;
    fn sort_value(&self, column: &str) -> SortValue;
}

impl Listable for ResumeRow {
    fn id(&self) -> i64 {
        self.id
    }

    fn sort_value(&self, column: &str) -> SortValue {
        match column {
            "id" => SortValue::Int(Some(self.id)),
            "file_name" => SortValue::Text(Some(self.file_name.clone())),
            "file_size" => SortValue::Int(self.file_size),
            "file_type" => SortValue::Text(self.file_type.clone()),
            _ => SortValue::Time(self.created_at),
        }
    }
}

impl Listable for JobRow {
    fn id(&self) -> i64 {
        self.id
    }

    fn sort_value(&self, column: &str) -> SortValue {
        match column {
            "id" => SortValue::Int(Some(self.id)),
            "title" => SortValue::Text(Some(self.title.clone())),
            "company" => SortValue::Text(Some(self.company.clone())),
            "location" => SortValue::Text(self.location.clone()),
            "type" => SortValue::Text(self.job_type.clone()),
            "posted" => SortValue::Text(self.posted.clone()),
            _ => SortValue::Time(self.created_at),
        }
    }
}

impl Listable for ApplicationRow {
    fn id(&self) -> i64 {
        self.id
    }

    fn sort_value(&self, column: &str) -> SortValue {
        match column {
            "id" => SortValue::Int(Some(self.id)),
            "job_id" => SortValue::Int(self.job_id),
            "job_title" => SortValue::Text(self.job_title.clone()),
            "company" => SortValue::Text(self.company.clone()),
            "status" => SortValue::Text(Some(self.status.as_str().to_string())),
            "applied_at" => SortValue::Text(self.applied_at.clone()),
            _ => SortValue::Time(self.created_at),
        }
    }
}

/// Sorts (ties by id ascending) and applies the page.
fn sort_and_page<'a, R, F>(rows: impl Iterator<Item = &'a R>, query: &ListQuery<F>) -> Vec<R>
where
    R: Listable + 'a,
{
    let mut rows: Vec<&R> = rows.collect();
    rows.sort_by(|a, b| {
        let by_column = a.sort_value(query.sort).cmp(&b.sort_value(query.sort));
        let by_column = match query.order {
            SortOrder::Asc => by_column,
            SortOrder::Desc => by_column.reverse(),
        };
        by_column.then_with(|| a.id().cmp(&b.id()))
    });
    rows.into_iter()
        .skip(usize::try_from(query.page.offset).unwrap_or(usize::MAX))
        .take(usize::try_from(query.page.limit).unwrap_or(0))
        .cloned()
        .collect()
}

fn matches_any(term: &str, values: &[Option<&str>]) -> bool {
    values
        .iter()
        .flatten()
        .any(|value| contains_ignore_case(value, term))
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn list_resumes(&self, user_id: &str, query: &ListQuery<()>) -> Result<Vec<ResumeRow>> {
        let tables = self.tables.read().await;
        let rows = tables.resumes.iter().filter(|r| {
            r.user_id == user_id
                && query
                    .search
                    .as_deref()
                    .map_or(true, |term| matches_any(term, &[Some(r.file_name.as_str())]))
        });
        Ok(sort_and_page(rows, query))
    }

    async fn get_resume(&self, user_id: &str, id: i64) -> Result<Option<ResumeRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .resumes
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn insert_resume(&self, user_id: &str, resume: NewResume) -> Result<ResumeRow> {
        let mut tables = self.tables.write().await;
        let row = ResumeRow {
            id: tables.next_id(),
            user_id: user_id.to_string(),
            resume_text: resume.resume_text,
            skills: Some(resume.skills),
            file_name: resume.file_name,
            file_size: resume.file_size,
            file_type: resume.file_type,
            created_at: Utc::now(),
        };
        tables.resumes.push(row.clone());
        Ok(row)
    }

    async fn update_resume(
        &self,
        user_id: &str,
        id: i64,
        changes: ResumeChanges,
    ) -> Result<Option<ResumeRow>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .resumes
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        changes.resume_text.apply_to(&mut row.resume_text);
        changes.skills.apply_to(&mut row.skills);
        if let Some(file_name) = changes.file_name {
            row.file_name = file_name;
        }
        changes.file_size.apply_to(&mut row.file_size);
        changes.file_type.apply_to(&mut row.file_type);
        Ok(Some(row.clone()))
    }

    async fn delete_resume(&self, user_id: &str, id: i64) -> Result<Option<ResumeRow>> {
        let mut tables = self.tables.write().await;
        let position = tables
            .resumes
            .iter()
            .position(|r| r.id == id && r.user_id == user_id);
        Ok(position.map(|i| tables.resumes.remove(i)))
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn list_jobs(&self, user_id: &str, query: &ListQuery<JobFilter>) -> Result<Vec<JobRow>> {
        let tables = self.tables.read().await;
        let filter = &query.filter;
        let rows = tables.jobs.iter().filter(|j| {
            j.user_id == user_id
                && query.search.as_deref().map_or(true, |term| {
                    matches_any(term, &[Some(j.title.as_str()), Some(j.company.as_str())])
                })
                && filter
                    .location
                    .as_deref()
                    .map_or(true, |loc| matches_any(loc, &[j.location.as_deref()]))
                && filter
                    .job_type
                    .as_deref()
                    .map_or(true, |t| j.job_type.as_deref() == Some(t))
        });
        Ok(sort_and_page(rows, query))
    }

    async fn get_job(&self, user_id: &str, id: i64) -> Result<Option<JobRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .find(|j| j.id == id && j.user_id == user_id)
            .cloned())
    }

    async fn insert_jobs(&self, user_id: &str, jobs: Vec<NewJob>) -> Result<Vec<JobRow>> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut rows = Vec::with_capacity(jobs.len());
        for job in jobs {
            rows.push(JobRow {
                id: tables.next_id(),
                user_id: user_id.to_string(),
                title: job.title,
                company: job.company,
                location: job.location,
                salary: job.salary,
                job_type: job.job_type,
                description: job.description,
                skills: job.skills,
                website: job.website,
                posted: job.posted,
                created_at: now,
            });
        }
        tables.jobs.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn update_job(
        &self,
        user_id: &str,
        id: i64,
        changes: JobChanges,
    ) -> Result<Option<JobRow>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == id && j.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(company) = changes.company {
            row.company = company;
        }
        changes.location.apply_to(&mut row.location);
        changes.salary.apply_to(&mut row.salary);
        changes.job_type.apply_to(&mut row.job_type);
        changes.description.apply_to(&mut row.description);
        changes.skills.apply_to(&mut row.skills);
        changes.website.apply_to(&mut row.website);
        changes.posted.apply_to(&mut row.posted);
        Ok(Some(row.clone()))
    }

    async fn delete_job(&self, user_id: &str, id: i64) -> Result<Option<JobRow>> {
        let mut tables = self.tables.write().await;
        let Some(position) = tables
            .jobs
            .iter()
            .position(|j| j.id == id && j.user_id == user_id)
        else {
            return Ok(None);
        };
        let removed = tables.jobs.remove(position);
        // Mirrors ON DELETE SET NULL.
        for application in tables
            .applications
            .iter_mut()
            .filter(|a| a.job_id == Some(id))
        {
            application.job_id = None;
        }
        Ok(Some(removed))
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn list_applications(
        &self,
        user_id: &str,
        query: &ListQuery<ApplicationFilter>,
    ) -> Result<Vec<ApplicationRow>> {
        let tables = self.tables.read().await;
        let rows = tables.applications.iter().filter(|a| {
            a.user_id == user_id
                && query.search.as_deref().map_or(true, |term| {
                    matches_any(term, &[a.job_title.as_deref(), a.company.as_deref()])
                })
                && query.filter.status.map_or(true, |s| a.status == s)
        });
        Ok(sort_and_page(rows, query))
    }

    async fn get_application(&self, user_id: &str, id: i64) -> Result<Option<ApplicationRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned())
    }

    async fn insert_application(
        &self,
        user_id: &str,
        application: NewApplication,
    ) -> Result<Option<ApplicationRow>> {
        let mut tables = self.tables.write().await;
        let owns_job = tables
            .jobs
            .iter()
            .any(|j| j.id == application.job_id && j.user_id == user_id);
        if !owns_job {
            return Ok(None);
        }
        let row = ApplicationRow {
            id: tables.next_id(),
            user_id: user_id.to_string(),
            job_id: Some(application.job_id),
            job_title: application.job_title,
            company: application.company,
            status: application.status,
            applied_at: application.applied_at,
            website: application.website,
            created_at: Utc::now(),
        };
        tables.applications.push(row.clone());
        Ok(Some(row))
    }

    async fn update_application_status(
        &self,
        user_id: &str,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .applications
            .iter_mut()
            .find(|a| a.id == id && a.user_id == user_id)
            .map(|row| {
                row.status = status;
                row.clone()
            }))
    }

    async fn delete_application(&self, user_id: &str, id: i64) -> Result<Option<ApplicationRow>> {
        let mut tables = self.tables.write().await;
        let position = tables
            .applications
            .iter()
            .position(|a| a.id == id && a.user_id == user_id);
        Ok(position.map(|i| tables.applications.remove(i)))
    }

    async fn count_applications(&self, user_id: &str) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .count() as i64)
    }

    async fn count_by_status(&self, user_id: &str) -> Result<Vec<StatusCount>> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<ApplicationStatus, i64> = HashMap::new();
        for application in tables.applications.iter().filter(|a| a.user_id == user_id) {
            *counts.entry(application.status).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(status, count)| StatusCount {
                status: status.as_str().to_string(),
                count,
            })
            .collect())
    }

    async fn count_created_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.user_id == user_id && a.created_at >= since)
            .count() as i64)
    }

    async fn count_by_company(&self, user_id: &str) -> Result<Vec<CompanyCount>> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for application in tables.applications.iter().filter(|a| a.user_id == user_id) {
            if let Some(company) = application.company.as_deref().filter(|c| !c.is_empty()) {
                *counts.entry(company).or_default() += 1;
            }
        }
        let mut rows: Vec<CompanyCount> = counts
            .into_iter()
            .map(|(company, count)| CompanyCount {
                company: company.to_string(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| match b.count.cmp(&a.count) {
            Ordering::Equal => a.company.cmp(&b.company),
            other => other,
        });
        Ok(rows)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        changes: ProfileChanges,
    ) -> Result<(ProfileRow, bool)> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        if let Some(row) = tables.profiles.iter_mut().find(|p| p.user_id == user_id) {
            changes.email.apply_to(&mut row.email);
            changes.phone.apply_to(&mut row.phone);
            changes.linkedin.apply_to(&mut row.linkedin);
            changes.cover_letter.apply_to(&mut row.cover_letter);
            row.updated_at = now;
            return Ok((row.clone(), false));
        }
        let row = ProfileRow {
            id: tables.next_id(),
            user_id: user_id.to_string(),
            email: changes.email.as_value().cloned(),
            phone: changes.phone.as_value().cloned(),
            linkedin: changes.linkedin.as_value().cloned(),
            cover_letter: changes.cover_letter.as_value().cloned(),
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(row.clone());
        Ok((row, true))
    }

    async fn delete_profile(&self, user_id: &str) -> Result<Option<ProfileRow>> {
        let mut tables = self.tables.write().await;
        let position = tables.profiles.iter().position(|p| p.user_id == user_id);
        Ok(position.map(|i| tables.profiles.remove(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Page;

    fn query(limit: i64, offset: i64, sort: &'static str, order: SortOrder) -> ListQuery<JobFilter> {
        ListQuery {
            page: Page { limit, offset },
            search: None,
            filter: JobFilter::default(),
            sort,
            order,
        }
    }

    fn job(title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            salary: None,
            job_type: None,
            description: None,
            skills: None,
            website: None,
            posted: None,
        }
    }

    #[tokio::test]
    async fn test_equal_sort_values_keep_insertion_order() {
        let store = MemoryStore::new();
        store
            .insert_jobs("u1", vec![job("a"), job("b"), job("c")])
            .await
            .unwrap();
        // One batch shares a timestamp.
        let rows = store
            .list_jobs("u1", &query(10, 0, "created_at", SortOrder::Desc))
            .await
            .unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_offset_and_limit_slice_sorted_rows() {
        let store = MemoryStore::new();
        store
            .insert_jobs("u1", vec![job("c"), job("a"), job("d"), job("b")])
            .await
            .unwrap();
        let rows = store
            .list_jobs("u1", &query(2, 1, "title", SortOrder::Asc))
            .await
            .unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["b", "c"]);
    }

    #[tokio::test]
    async fn test_text_sorts_bytewise_with_nulls_at_the_ascending_end() {
        let store = MemoryStore::new();
        let located = |title: &str, location: Option<&str>| NewJob {
            location: location.map(String::from),
            ..job(title)
        };
        store
            .insert_jobs(
                "u1",
                vec![
                    located("a", Some("berlin")),
                    located("b", None),
                    located("c", Some("Austin")),
                ],
            )
            .await
            .unwrap();
        let titles = |rows: Vec<JobRow>| -> Vec<String> { rows.into_iter().map(|r| r.title).collect() };

        let asc = store
            .list_jobs("u1", &query(10, 0, "location", SortOrder::Asc))
            .await
            .unwrap();
        assert_eq!(titles(asc), ["b", "c", "a"]);

        let desc = store
            .list_jobs("u1", &query(10, 0, "location", SortOrder::Desc))
            .await
            .unwrap();
        assert_eq!(titles(desc), ["a", "c", "b"]);
    }

    #[tokio::test]
    async fn test_rows_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let rows = store.insert_jobs("u1", vec![job("a")]).await.unwrap();
        let id = rows[0].id;
        assert!(store.get_job("u2", id).await.unwrap().is_none());
        assert!(store.delete_job("u2", id).await.unwrap().is_none());
        assert!(store.get_job("u1", id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_application_insert_requires_owned_job() {
        let store = MemoryStore::new();
        let rows = store.insert_jobs("u1", vec![job("a")]).await.unwrap();
        let application = NewApplication {
            job_id: rows[0].id,
            job_title: None,
            company: None,
            status: ApplicationStatus::Pending,
            applied_at: None,
            website: None,
        };
        assert!(store
            .insert_application("u2", application.clone())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .insert_application("u1", application)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_deleting_job_detaches_applications() {
        let store = MemoryStore::new();
        let rows = store.insert_jobs("u1", vec![job("a")]).await.unwrap();
        let application = store
            .insert_application(
                "u1",
                NewApplication {
                    job_id: rows[0].id,
                    job_title: Some("a".into()),
                    company: Some("Acme".into()),
                    status: ApplicationStatus::Success,
                    applied_at: None,
                    website: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        store.delete_job("u1", rows[0].id).await.unwrap();
        let after = store
            .get_application("u1", application.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.job_id, None);
    }
}
