mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod jobs;
mod models;
mod profile;
mod resumes;
mod routes;
mod state;
mod store;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::applications::submitter::RecordOnlySubmitter;
use crate::auth::{AuthGate, SessionAuth, StaticTokenAuth};
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::jobs::search::StaticJobCatalog;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ApplyTrack API v{}", env!("CARGO_PKG_VERSION"));

    let static_auth = StaticTokenAuth::new(config.api_tokens.clone());

    let (store, auth): (Arc<dyn Store>, Arc<dyn AuthGate>) = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            let auth: Arc<dyn AuthGate> = if static_auth.is_empty() {
                info!("Authenticating bearer tokens against the sessions table");
                Arc::new(SessionAuth::new(pool.clone()))
            } else {
                info!("Authenticating bearer tokens against API_TOKENS");
                Arc::new(static_auth)
            };
            let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
            (store, auth)
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            if static_auth.is_empty() {
                warn!("API_TOKENS is empty; every request will be rejected as unauthorized");
            }
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            let auth: Arc<dyn AuthGate> = Arc::new(static_auth);
            (store, auth)
        }
    };

    let state = AppState {
        store,
        auth,
        job_search: Arc::new(StaticJobCatalog::default()),
        submitter: Arc::new(RecordOnlySubmitter),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
