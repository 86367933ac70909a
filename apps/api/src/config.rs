use std::collections::HashMap;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without it the API runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    /// Static bearer tokens, `token=user_id` pairs.
    pub api_tokens: HashMap<String, String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            database_max_connections: optional_env("DATABASE_MAX_CONNECTIONS")
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?
                .unwrap_or(10),
            run_migrations: optional_env("RUN_MIGRATIONS")
                .map(|v| parse_bool(&v))
                .transpose()
                .context("RUN_MIGRATIONS must be true or false")?
                .unwrap_or(true),
            api_tokens: optional_env("API_TOKENS")
                .map(|v| parse_tokens(&v))
                .transpose()?
                .unwrap_or_default(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}

/// Parses `token=user,token2=user2`.
fn parse_tokens(value: &str) -> Result<HashMap<String, String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<(String, String)> {
            let (token, user) = pair
                .split_once('=')
                .with_context(|| format!("API_TOKENS entry '{pair}' is not token=user_id"))?;
            let (token, user) = (token.trim(), user.trim());
            if token.is_empty() || user.is_empty() {
                bail!("API_TOKENS entry '{pair}' has an empty token or user id");
            }
            Ok((token.to_string(), user.to_string()))
        })
        .collect()
}
