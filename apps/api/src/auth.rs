//! AuthGate: resolves the caller's identity from the request.
//!
//! Sessions are issued by the external auth service. This module only reads
//! them. Handlers take a [`Caller`] argument, so there is no ambient session state.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use sqlx::PgPool;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Verified identity of the user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}

#[async_trait]
pub trait AuthGate: Send + Sync {
    /// `Ok(None)` for an unknown or expired token.
    async fn authenticate(&self, token: &str) -> Result<Option<Caller>, AppError>;
}

/// Looks bearer tokens up in the auth service's `sessions` table.
pub struct SessionAuth {
    pool: PgPool,
}

impl SessionAuth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthGate for SessionAuth {
    async fn authenticate(&self, token: &str) -> Result<Option<Caller>, AppError> {
        let user_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT s.user_id
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id.map(|user_id| Caller { user_id }))
    }
}

/// Fixed token → user table, for demo deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuth {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl AuthGate for StaticTokenAuth {
    async fn authenticate(&self, token: &str) -> Result<Option<Caller>, AppError> {
        Ok(self.tokens.get(token).map(|user_id| Caller {
            user_id: user_id.clone(),
        }))
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(AppError::Unauthorized);
        };
        match state.auth.authenticate(token).await? {
            Some(caller) => Ok(caller),
            None => {
                warn!("Rejected request to {} with unknown token", parts.uri.path());
                Err(AppError::Unauthorized)
            }
        }
    }
}
