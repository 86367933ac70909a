//! Job search collaborator.
//!
//! `JobSearchProvider` stands in for a real job board. The default
//! `StaticJobCatalog` serves a fixed set of postings matched by skill overlap
//! and a substring query.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::jobs::service::create_jobs;
use crate::models::job::{CreateJobRequest, JobRow};
use crate::resumes::service::get_resume;
use crate::store::{JobStore, ResumeStore};
use crate::validation::{contains_ignore_case, non_empty};

/// A posting as returned by a search backend, before it is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub job_type: String,
    pub description: String,
    pub skills: Vec<String>,
    pub website: String,
    pub posted: String,
}

impl From<JobPosting> for CreateJobRequest {
    fn from(posting: JobPosting) -> Self {
        CreateJobRequest {
            title: Some(posting.title),
            company: Some(posting.company),
            location: Some(posting.location),
            salary: Some(posting.salary),
            job_type: Some(posting.job_type),
            description: Some(posting.description),
            skills: Some(posting.skills),
            website: Some(posting.website),
            posted: Some(posting.posted),
        }
    }
}

#[async_trait]
pub trait JobSearchProvider: Send + Sync {
    async fn search(&self, query: Option<&str>, skills: &[String]) -> Result<Vec<JobPosting>>;
}

pub struct StaticJobCatalog {
    postings: Vec<JobPosting>,
}

impl StaticJobCatalog {
    pub fn new(postings: Vec<JobPosting>) -> Self {
        Self { postings }
    }
}

#[allow(clippy::too_many_arguments)]
fn posting(
    title: &str,
    company: &str,
    location: &str,
    salary: &str,
    description: &str,
    skills: &[&str],
    website: &str,
    posted: &str,
) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        salary: salary.to_string(),
        job_type: "Full-time".to_string(),
        description: description.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        website: website.to_string(),
        posted: posted.to_string(),
    }
}

impl Default for StaticJobCatalog {
    fn default() -> Self {
        Self::new(vec![
            posting(
                "Senior Full Stack Developer",
                "Tech Solutions Inc.",
                "Bangalore, India",
                "₹15-25 LPA",
                "We are looking for an experienced Full Stack Developer with expertise in React, Node.js, and cloud technologies.",
                &["React", "Node.js", "TypeScript", "AWS", "MongoDB"],
                "naukri.com",
                "2 days ago",
            ),
            posting(
                "Frontend Developer",
                "Digital Innovations",
                "Mumbai, India",
                "₹10-18 LPA",
                "Join our team as a Frontend Developer to build cutting-edge web applications using modern frameworks.",
                &["React", "JavaScript", "HTML", "CSS", "TypeScript"],
                "naukri.com",
                "1 day ago",
            ),
            posting(
                "DevOps Engineer",
                "Cloud Systems Ltd.",
                "Hyderabad, India",
                "₹12-20 LPA",
                "Seeking a DevOps Engineer to manage our cloud infrastructure and CI/CD pipelines.",
                &["AWS", "Docker", "Kubernetes", "Jenkins", "Python"],
                "linkedin.com",
                "3 days ago",
            ),
            posting(
                "Python Developer",
                "Data Analytics Corp",
                "Pune, India",
                "₹8-15 LPA",
                "Looking for a Python Developer with experience in data processing and API development.",
                &["Python", "Django", "PostgreSQL", "REST API", "Git"],
                "indeed.com",
                "5 days ago",
            ),
            posting(
                "Full Stack JavaScript Developer",
                "Startup Hub",
                "Remote",
                "₹18-30 LPA",
                "Join our fast-growing startup as a Full Stack JavaScript Developer working on innovative products.",
                &["JavaScript", "React", "Node.js", "MongoDB", "Express"],
                "naukri.com",
                "1 week ago",
            ),
            posting(
                "Software Engineer",
                "Enterprise Solutions",
                "Delhi NCR, India",
                "₹10-16 LPA",
                "We need a Software Engineer with strong problem-solving skills and experience in modern web technologies.",
                &["Java", "Spring Boot", "React", "SQL", "Git"],
                "naukri.com",
                "4 days ago",
            ),
        ])
    }
}

#[async_trait]
impl JobSearchProvider for StaticJobCatalog {
    async fn search(&self, query: Option<&str>, skills: &[String]) -> Result<Vec<JobPosting>> {
        Ok(self
            .postings
            .iter()
            .filter(|p| {
                let shares_skill = p
                    .skills
                    .iter()
                    .any(|s| skills.iter().any(|own| own.eq_ignore_ascii_case(s)));
                let matches_query = query.map_or(true, |q| {
                    contains_ignore_case(&p.title, q) || contains_ignore_case(&p.description, q)
                });
                shares_skill && matches_query
            })
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchRequest {
    pub query: Option<String>,
    pub skills: Option<Vec<String>>,
    pub resume_id: Option<i64>,
}

/// Runs the provider with the caller's skills and saves every match as a job
/// owned by the caller. Skills come from the body, else from an owned résumé.
pub async fn search_and_save<S>(
    store: &S,
    provider: &dyn JobSearchProvider,
    caller: &Caller,
    req: JobSearchRequest,
) -> Result<Vec<JobRow>, AppError>
where
    S: JobStore + ResumeStore + ?Sized,
{
    let skills = match (req.skills, req.resume_id) {
        (Some(skills), _) => skills,
        (None, Some(resume_id)) => get_resume(store, caller, resume_id)
            .await?
            .skills
            .unwrap_or_default(),
        (None, None) => {
            return Err(AppError::MissingRequiredField(
                "skills or resumeId is required".to_string(),
            ))
        }
    };
    let query = non_empty(req.query);

    let postings = provider.search(query.as_deref(), &skills).await?;
    info!(
        "Job search for user {} matched {} posting(s)",
        caller.user_id,
        postings.len()
    );
    if postings.is_empty() {
        return Ok(Vec::new());
    }
    create_jobs(
        store,
        caller,
        postings.into_iter().map(CreateJobRequest::from).collect(),
    )
    .await
}
