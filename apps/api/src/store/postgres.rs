use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{Encode, FromRow, PgPool, Postgres, QueryBuilder, Row, Type};
use tracing::debug;

use crate::models::application::{
    ApplicationFilter, ApplicationRow, ApplicationStatus, NewApplication,
};
use crate::models::job::{JobChanges, JobFilter, JobRow, NewJob};
use crate::models::profile::{ProfileChanges, ProfileRow};
use crate::models::resume::{NewResume, ResumeChanges, ResumeRow};
use crate::store::{
    ApplicationStore, CompanyCount, JobStore, ProfileStore, ResumeStore, StatusCount,
};
use crate::validation::{like_pattern, ListQuery};

/// Postgres-backed store. Every statement carries `user_id = $n` in its
/// WHERE clause, including the mutating ones.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `SELECT * FROM {table} WHERE user_id = $1`, ready for more predicates.
fn select_owned<'args>(table: &str, user_id: &'args str) -> QueryBuilder<'args, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT * FROM {table} WHERE user_id = "));
    qb.push_bind(user_id);
    qb
}

/// Appends `AND (col1 ILIKE $n OR col2 ILIKE $n ...)`.
fn push_search<'args>(qb: &mut QueryBuilder<'args, Postgres>, columns: &[&str], term: &str) {
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(format!("{column} ILIKE "));
        qb.push_bind(pattern.clone());
    }
    qb.push(")");
}

/// Sortable columns that are not text.
const NON_TEXT_SORTS: &[&str] = &["id", "created_at", "job_id", "file_size"];

/// Text columns order bytewise (`COLLATE "C"`), the same order as `String`.
fn sort_expr(column: &str) -> String {
    if NON_TEXT_SORTS.contains(&column) {
        column.to_string()
    } else {
        format!("{column} COLLATE \"C\"")
    }
}

/// Appends ORDER BY, the insertion-order tiebreak, LIMIT and OFFSET.
fn push_order_and_page<'args, F>(qb: &mut QueryBuilder<'args, Postgres>, query: &ListQuery<F>) {
    qb.push(format!(
        " ORDER BY {} {}, id ASC LIMIT ",
        sort_expr(query.sort),
        query.order.sql()
    ));
    qb.push_bind(query.page.limit);
    qb.push(" OFFSET ");
    qb.push_bind(query.page.offset);
}

fn set_column<'args, T>(set: &mut Separated<'_, 'args, Postgres, &'static str>, column: &str, value: T)
where
    T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
{
    set.push(format!("{column} = "));
    set.push_bind_unseparated(value);
}

/// Appends `WHERE id = $a AND user_id = $b RETURNING *`.
fn push_owned_returning<'args>(qb: &mut QueryBuilder<'args, Postgres>, id: i64, user_id: &'args str) {
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" AND user_id = ");
    qb.push_bind(user_id);
    qb.push(" RETURNING *");
}

#[async_trait]
impl ResumeStore for PgStore {
    async fn list_resumes(&self, user_id: &str, query: &ListQuery<()>) -> Result<Vec<ResumeRow>> {
        let mut qb = select_owned("resumes", user_id);
        if let Some(term) = &query.search {
            push_search(&mut qb, &["file_name"], term);
        }
        push_order_and_page(&mut qb, query);
        Ok(qb.build_query_as::<ResumeRow>().fetch_all(&self.pool).await?)
    }

    async fn get_resume(&self, user_id: &str, id: i64) -> Result<Option<ResumeRow>> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_resume(&self, user_id: &str, resume: NewResume) -> Result<ResumeRow> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (user_id, resume_text, skills, file_name, file_size, file_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(resume.resume_text)
        .bind(resume.skills)
        .bind(resume.file_name)
        .bind(resume.file_size)
        .bind(resume.file_type)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_resume(
        &self,
        user_id: &str,
        id: i64,
        changes: ResumeChanges,
    ) -> Result<Option<ResumeRow>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE resumes SET ");
        let mut touched = 0;
        {
            let mut set = qb.separated(", ");
            if let Some(v) = changes.resume_text.into_change() {
                set_column(&mut set, "resume_text", v);
                touched += 1;
            }
            if let Some(v) = changes.skills.into_change() {
                set_column(&mut set, "skills", v);
                touched += 1;
            }
            if let Some(v) = changes.file_name {
                set_column(&mut set, "file_name", v);
                touched += 1;
            }
            if let Some(v) = changes.file_size.into_change() {
                set_column(&mut set, "file_size", v);
                touched += 1;
            }
            if let Some(v) = changes.file_type.into_change() {
                set_column(&mut set, "file_type", v);
                touched += 1;
            }
        }
        if touched == 0 {
            debug!("Empty resume update for {id}; returning current row");
            return self.get_resume(user_id, id).await;
        }
        push_owned_returning(&mut qb, id, user_id);
        Ok(qb
            .build_query_as::<ResumeRow>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_resume(&self, user_id: &str, id: i64) -> Result<Option<ResumeRow>> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "DELETE FROM resumes WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn list_jobs(&self, user_id: &str, query: &ListQuery<JobFilter>) -> Result<Vec<JobRow>> {
        let mut qb = select_owned("jobs", user_id);
        if let Some(term) = &query.search {
            push_search(&mut qb, &["title", "company"], term);
        }
        if let Some(location) = &query.filter.location {
            push_search(&mut qb, &["location"], location);
        }
        if let Some(job_type) = &query.filter.job_type {
            qb.push(" AND type = ");
            qb.push_bind(job_type.clone());
        }
        push_order_and_page(&mut qb, query);
        Ok(qb.build_query_as::<JobRow>().fetch_all(&self.pool).await?)
    }

    async fn get_job(&self, user_id: &str, id: i64) -> Result<Option<JobRow>> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_jobs(&self, user_id: &str, jobs: Vec<NewJob>) -> Result<Vec<JobRow>> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(jobs.len());
        for job in jobs {
            let row = sqlx::query_as::<_, JobRow>(
                r#"
                INSERT INTO jobs
                    (user_id, title, company, location, salary, type,
                     description, skills, website, posted)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(job.title)
            .bind(job.company)
            .bind(job.location)
            .bind(job.salary)
            .bind(job.job_type)
            .bind(job.description)
            .bind(job.skills)
            .bind(job.website)
            .bind(job.posted)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    async fn update_job(
        &self,
        user_id: &str,
        id: i64,
        changes: JobChanges,
    ) -> Result<Option<JobRow>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE jobs SET ");
        let mut touched = 0;
        {
            let mut set = qb.separated(", ");
            if let Some(v) = changes.title {
                set_column(&mut set, "title", v);
                touched += 1;
            }
            if let Some(v) = changes.company {
                set_column(&mut set, "company", v);
                touched += 1;
            }
            for (column, field) in [
                ("location", changes.location),
                ("salary", changes.salary),
                ("type", changes.job_type),
                ("description", changes.description),
                ("website", changes.website),
                ("posted", changes.posted),
            ] {
                if let Some(v) = field.into_change() {
                    set_column(&mut set, column, v);
                    touched += 1;
                }
            }
            if let Some(v) = changes.skills.into_change() {
                set_column(&mut set, "skills", v);
                touched += 1;
            }
        }
        if touched == 0 {
            debug!("Empty job update for {id}; returning current row");
            return self.get_job(user_id, id).await;
        }
        push_owned_returning(&mut qb, id, user_id);
        Ok(qb.build_query_as::<JobRow>().fetch_optional(&self.pool).await?)
    }

    async fn delete_job(&self, user_id: &str, id: i64) -> Result<Option<JobRow>> {
        Ok(
            sqlx::query_as::<_, JobRow>("DELETE FROM jobs WHERE id = $1 AND user_id = $2 RETURNING *")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn list_applications(
        &self,
        user_id: &str,
        query: &ListQuery<ApplicationFilter>,
    ) -> Result<Vec<ApplicationRow>> {
        let mut qb = select_owned("applications", user_id);
        if let Some(term) = &query.search {
            push_search(&mut qb, &["job_title", "company"], term);
        }
        if let Some(status) = query.filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        push_order_and_page(&mut qb, query);
        Ok(qb
            .build_query_as::<ApplicationRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_application(&self, user_id: &str, id: i64) -> Result<Option<ApplicationRow>> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_application(
        &self,
        user_id: &str,
        application: NewApplication,
    ) -> Result<Option<ApplicationRow>> {
        // The job ownership check and the insert are one statement.
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications
                (user_id, job_id, job_title, company, status, applied_at, website)
            SELECT $1, j.id, $3, $4, $5, $6, $7
            FROM jobs j
            WHERE j.id = $2 AND j.user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(application.job_id)
        .bind(application.job_title)
        .bind(application.company)
        .bind(application.status.as_str())
        .bind(application.applied_at)
        .bind(application.website)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_application_status(
        &self,
        user_id: &str,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "UPDATE applications SET status = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_application(&self, user_id: &str, id: i64) -> Result<Option<ApplicationRow>> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "DELETE FROM applications WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn count_applications(&self, user_id: &str) -> Result<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn count_by_status(&self, user_id: &str) -> Result<Vec<StatusCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM applications WHERE user_id = $1 GROUP BY status",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn count_created_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn count_by_company(&self, user_id: &str) -> Result<Vec<CompanyCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT company, COUNT(*) AS count
            FROM applications
            WHERE user_id = $1 AND company IS NOT NULL AND company <> ''
            GROUP BY company
            ORDER BY count DESC, company COLLATE "C" ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(company, count)| CompanyCount { company, count })
            .collect())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRow>> {
        Ok(
            sqlx::query_as::<_, ProfileRow>("SELECT * FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        changes: ProfileChanges,
    ) -> Result<(ProfileRow, bool)> {
        // A single statement keeps the one-profile-per-user invariant under
        // concurrent first writes. `xmax = 0` only holds for freshly inserted rows.
        let row = sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, email, phone, linkedin, cover_letter)
            VALUES ($1, $2, $4, $6, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                email        = CASE WHEN $3 THEN EXCLUDED.email        ELSE user_profiles.email        END,
                phone        = CASE WHEN $5 THEN EXCLUDED.phone        ELSE user_profiles.phone        END,
                linkedin     = CASE WHEN $7 THEN EXCLUDED.linkedin     ELSE user_profiles.linkedin     END,
                cover_letter = CASE WHEN $9 THEN EXCLUDED.cover_letter ELSE user_profiles.cover_letter END,
                updated_at   = now()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id)
        .bind(changes.email.as_value().cloned())
        .bind(changes.email.is_present())
        .bind(changes.phone.as_value().cloned())
        .bind(changes.phone.is_present())
        .bind(changes.linkedin.as_value().cloned())
        .bind(changes.linkedin.is_present())
        .bind(changes.cover_letter.as_value().cloned())
        .bind(changes.cover_letter.is_present())
        .fetch_one(&self.pool)
        .await?;

        let inserted: bool = row.try_get("inserted")?;
        Ok((ProfileRow::from_row(&row)?, inserted))
    }

    async fn delete_profile(&self, user_id: &str) -> Result<Option<ProfileRow>> {
        Ok(sqlx::query_as::<_, ProfileRow>(
            "DELETE FROM user_profiles WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
