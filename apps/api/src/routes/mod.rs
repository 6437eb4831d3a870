pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::jobs::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Animation API
        .route(
            "/api/v1/animations/generate",
            post(handlers::handle_generate),
        )
        .route(
            "/api/v1/animations/status/:job_id",
            get(handlers::handle_status),
        )
        .route(
            "/api/v1/animations/download/:job_id",
            get(handlers::handle_download),
        )
        // Feedback API
        .route("/api/v1/feedback", post(handlers::handle_feedback))
        .with_state(state)
}
