use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::field::Field;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRow {
    pub id: i64,
    pub user_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body shared by POST and PUT; the two differ only in how `null` and `""` are read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub email: Field<String>,
    #[serde(default)]
    pub phone: Field<String>,
    #[serde(default)]
    pub linkedin: Field<String>,
    #[serde(default)]
    pub cover_letter: Field<String>,
}

/// Normalised upsert. On insert, `Absent` and `Null` both store NULL.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Field<String>,
    pub phone: Field<String>,
    pub linkedin: Field<String>,
    pub cover_letter: Field<String>,
}
