//! Request-level validation shared by every resource: ids, pagination,
//! sorting, required text and email shape.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::application::ApplicationStatus;
use crate::models::field::Field;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Query string accepted by every list/get endpoint. Values stay raw so that
/// malformed numbers produce our own error codes rather than a rejection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListParams {
    pub id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct IdParams {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        // NULL placement matches `Option` ordering so both stores agree.
        match self {
            SortOrder::Asc => "ASC NULLS FIRST",
            SortOrder::Desc => "DESC NULLS LAST",
        }
    }
}

/// A fully validated list request. `sort` is always a column from the
/// resource's whitelist, never caller text.
#[derive(Debug, Clone)]
pub struct ListQuery<F> {
    pub page: Page,
    pub search: Option<String>,
    pub filter: F,
    pub sort: &'static str,
    pub order: SortOrder,
}

/// Parses an id as a positive integer.
pub fn parse_id(raw: Option<&str>) -> Result<i64, AppError> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::InvalidId("Valid ID is required".to_string()))
}

pub fn parse_page(params: &ListParams) -> Result<Page, AppError> {
    let limit = match params.limit.as_deref() {
        None => DEFAULT_LIMIT,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|l| *l > 0)
            .ok_or_else(|| {
                AppError::InvalidPagination("limit must be a positive integer".to_string())
            })?
            .min(MAX_LIMIT),
    };
    let offset = match params.offset.as_deref() {
        None => 0,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|o| *o >= 0)
            .ok_or_else(|| {
                AppError::InvalidPagination("offset must be a non-negative integer".to_string())
            })?,
    };
    Ok(Page { limit, offset })
}

/// Maps the public `sort` name to a column via `allowed`, falling back to
/// `created_at` when missing or unknown. Only `asc` sorts ascending.
pub fn parse_sort(
    params: &ListParams,
    allowed: &[(&str, &'static str)],
) -> (&'static str, SortOrder) {
    let column = params
        .sort
        .as_deref()
        .and_then(|name| {
            allowed
                .iter()
                .find(|(public, _)| *public == name.trim())
                .map(|(_, column)| *column)
        })
        .unwrap_or("created_at");
    let order = match params.order.as_deref().map(str::trim) {
        Some(o) if o.eq_ignore_ascii_case("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    };
    (column, order)
}

/// Builds a `ListQuery` from the shared parts of `params`.
pub fn list_query<F>(
    params: &ListParams,
    allowed_sorts: &[(&str, &'static str)],
    filter: F,
) -> Result<ListQuery<F>, AppError> {
    let page = parse_page(params)?;
    let (sort, order) = parse_sort(params, allowed_sorts);
    Ok(ListQuery {
        page,
        search: non_empty(params.search.clone()),
        filter,
        sort,
        order,
    })
}

/// Trims; blank becomes `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Required non-blank text, trimmed.
pub fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    non_empty(value).ok_or_else(|| AppError::MissingRequiredField(format!("{field} is required")))
}

/// An optional text column in an update. `null` and blank both clear it.
pub fn optional_text_change(value: Field<String>) -> Field<String> {
    match value {
        Field::Value(v) => match non_empty(Some(v)) {
            Some(v) => Field::Value(v),
            None => Field::Null,
        },
        other => other,
    }
}

/// A required text column in an update: it may be replaced but never emptied.
pub fn required_text_change(value: Field<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        Field::Absent => Ok(None),
        present => non_empty(present.as_value().cloned())
            .map(Some)
            .ok_or_else(|| AppError::InvalidField(format!("{field} must be a non-empty string"))),
    }
}

pub fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    raw.parse::<ApplicationStatus>()
        .map_err(|e| AppError::InvalidEnumValue(e.to_string()))
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with text on both sides of it.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Escapes `\`, `%` and `_` so caller text matches literally inside ILIKE.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Case-insensitive substring test used by the in-memory store and job search.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
