use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use thiserror::Error;

use crate::models::field::Field;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Success,
    Failed,
    Pending,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Success => "success",
            ApplicationStatus::Failed => "failed",
            ApplicationStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("status must be one of: success, failed, pending (got '{0}')")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "success" => Ok(ApplicationStatus::Success),
            "failed" => Ok(ApplicationStatus::Failed),
            "pending" => Ok(ApplicationStatus::Pending),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: i64,
    pub user_id: String,
    pub job_id: Option<i64>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub applied_at: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub job_id: Option<i64>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
    pub applied_at: Option<String>,
    pub website: Option<String>,
}

/// PATCH body. Every key other than `status` lands in `other` and is rejected.
#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: Field<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub job_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: i64,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_known_values() {
        assert_eq!(
            "success".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Success
        );
        assert_eq!(
            " pending ".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Pending
        );
    }

    #[test]
    fn test_status_rejects_unknown_and_wrong_case() {
        assert!("bogus".parse::<ApplicationStatus>().is_err());
        assert!("Success".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_update_collects_extra_keys() {
        let req: StatusUpdateRequest =
            serde_json::from_str(r#"{"status": "success", "website": "x"}"#).unwrap();
        assert_eq!(req.status, Field::Value("success".to_string()));
        assert!(req.other.contains_key("website"));
    }
}
