pub mod health;


use axum::{
    routing::{get, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::jobs::handlers as jobs;
use crate::profile::handlers as profile;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resumes
        .route(
            "/api/v1/resumes",
            get(resumes::handle_get_resumes)
                .post(resumes::handle_create_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route("/api/v1/resumes/skills", post(resumes::handle_extract_skills))
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_get_jobs)
                .post(jobs::handle_create_jobs)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route("/api/v1/jobs/search", post(jobs::handle_search_jobs))
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handle_get_applications)
                .post(applications::handle_create_application)
                .patch(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/v1/applications/submit",
            post(applications::handle_submit_application),
        )
        .route(
            "/api/v1/applications/stats",
            get(applications::handle_application_stats),
        )
        // Profile
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile)
                .post(profile::handle_post_profile)
                .put(profile::handle_put_profile)
                .delete(profile::handle_delete_profile),
        )
        .with_state(state)
}
