use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::field::Field;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    pub id: i64,
    pub user_id: String,
    pub resume_text: Option<String>,
    pub skills: Option<Vec<String>>,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// POST body. Any `userId` in the body is ignored; ownership comes from the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub resume_text: Option<String>,
    pub skills: Option<Vec<String>>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
}

/// PUT body: only keys present in the body are written.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResumeRequest {
    #[serde(default)]
    pub resume_text: Field<String>,
    #[serde(default)]
    pub skills: Field<Vec<String>>,
    #[serde(default)]
    pub file_name: Field<String>,
    #[serde(default)]
    pub file_size: Field<i64>,
    #[serde(default)]
    pub file_type: Field<String>,
}

/// A validated resume ready to insert.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub resume_text: Option<String>,
    pub skills: Vec<String>,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
}

/// A validated change set. `file_name` can never be cleared.
#[derive(Debug, Clone, Default)]
pub struct ResumeChanges {
    pub resume_text: Field<String>,
    pub skills: Field<Vec<String>>,
    pub file_name: Option<String>,
    pub file_size: Field<i64>,
    pub file_type: Field<String>,
}
