pub mod health;
pub mod identity;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assistant::handlers as ai;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

/// Headroom for multipart framing on top of the file size cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route(
            "/api/v1/resumes",
            post(resumes::handle_upload).get(resumes::handle_list),
        )
        .route("/api/v1/resumes/:id", get(resumes::handle_get))
        // Career assistant API
        .route("/api/v1/ai/cover-letter", post(ai::handle_cover_letter))
        .route("/api/v1/ai/mock-questions", post(ai::handle_mock_questions))
        .route("/api/v1/ai/career-advice", post(ai::handle_career_advice))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
