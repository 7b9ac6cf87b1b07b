pub mod health;
pub mod index;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::health_handler))
        // Match API
        .route("/api/v1/match", post(handlers::handle_match))
        .route("/api/v1/match/text", post(handlers::handle_match_text))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
