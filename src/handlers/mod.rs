// Painel web: visão dos jobs, disparo e status
pub mod dashboard;
pub mod health;

pub use dashboard::*;
pub use health::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Todas as rotas do painel
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/run/:job", post(run_job_form))
        .route("/api/jobs/:job/run", post(run_job_api))
        .route("/status", get(jobs_status))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
