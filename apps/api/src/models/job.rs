use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::models::field::Field;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub job_type: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub website: Option<String>,
    pub posted: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub website: Option<String>,
    pub posted: Option<String>,
}

/// Jobs accept either a single object or an array of them. Entries stay raw
/// so that a malformed one can be reported by its index.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JobBatch {
    Many(Vec<Value>),
    One(Value),
}

impl JobBatch {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            JobBatch::Many(jobs) => jobs,
            JobBatch::One(job) => vec![job],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(default)]
    pub title: Field<String>,
    #[serde(default)]
    pub company: Field<String>,
    #[serde(default)]
    pub location: Field<String>,
    #[serde(default)]
    pub salary: Field<String>,
    #[serde(default, rename = "type")]
    pub job_type: Field<String>,
    #[serde(default)]
    pub description: Field<String>,
    #[serde(default)]
    pub skills: Field<Vec<String>>,
    #[serde(default)]
    pub website: Field<String>,
    #[serde(default)]
    pub posted: Field<String>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub website: Option<String>,
    pub posted: Option<String>,
}

/// `title` and `company` are required columns, so they can be replaced but not cleared.
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Field<String>,
    pub salary: Field<String>,
    pub job_type: Field<String>,
    pub description: Field<String>,
    pub skills: Field<Vec<String>>,
    pub website: Field<String>,
    pub posted: Field<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub location: Option<String>,
    pub job_type: Option<String>,
}
