use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    InvalidPagination(String),

    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    MissingRequiredField(String),

    #[error("{0}")]
    InvalidField(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{0}")]
    InvalidEnumValue(String),

    #[error("{0}")]
    InvalidForeignKey(String),

    #[error("{0}")]
    InvalidUpdateFields(String),

    #[error("At least one job is required")]
    EmptyBatch,

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::InvalidId(_) => "INVALID_ID",
            AppError::InvalidPagination(_) => "INVALID_PAGINATION",
            AppError::InvalidQuery(_) => "INVALID_QUERY",
            AppError::InvalidBody(_) => "INVALID_BODY",
            AppError::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            AppError::InvalidField(_) => "INVALID_FIELD",
            AppError::InvalidEmail => "INVALID_EMAIL",
            AppError::InvalidEnumValue(_) => "INVALID_STATUS",
            AppError::InvalidForeignKey(_) => "INVALID_FOREIGN_KEY",
            AppError::InvalidUpdateFields(_) => "INVALID_UPDATE_FIELDS",
            AppError::EmptyBatch => "EMPTY_JOBS_ARRAY",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => {}
        }

        // Store failures surface their message verbatim; this is a demo deployment.
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_request() {
        for err in [
            AppError::InvalidId("Valid ID is required".into()),
            AppError::InvalidQuery("duplicate field `id`".into()),
            AppError::MissingRequiredField("title is required".into()),
            AppError::InvalidEnumValue("bad".into()),
            AppError::InvalidForeignKey("bad".into()),
            AppError::InvalidUpdateFields("bad".into()),
            AppError::EmptyBatch,
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_codes_match_wire_contract() {
        assert_eq!(AppError::InvalidEnumValue(String::new()).code(), "INVALID_STATUS");
        assert_eq!(AppError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_error_keeps_message() {
        let err = AppError::Internal(anyhow::anyhow!("connection reset"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("connection reset"));
    }
}
