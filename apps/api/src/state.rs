use std::sync::Arc;

use crate::applications::submitter::ApplicationSubmitter;
use crate::auth::AuthGate;
use crate::jobs::search::JobSearchProvider;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory when no DATABASE_URL is configured.
    pub store: Arc<dyn Store>,
    pub auth: Arc<dyn AuthGate>,
    /// Pluggable job board. Default: StaticJobCatalog.
    pub job_search: Arc<dyn JobSearchProvider>,
    /// Pluggable submission backend. Default: RecordOnlySubmitter.
    pub submitter: Arc<dyn ApplicationSubmitter>,
}
