use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version, the scoring model, and which remote feedback backends are wired.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-matcher",
        "embedding_model": state.config.embedding_model,
        "loaded_models": state.models.loaded_models(),
        "feedback_backends": state.feedback.remote_backends(),
    }))
}
