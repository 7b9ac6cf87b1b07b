//! Match pipeline — runs one resume against one job description.
//!
//! Flow: extract_resume → score (blocking pool) → feedback chain → MatchReport.
//!
//! Extraction and scoring failures abort the request. Feedback never does: if the
//! feedback task itself dies, the report carries an `Error`-sourced diagnostic.

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::errors::AppError;
use crate::extract::extract_text;
use crate::feedback::{FeedbackResult, FeedbackSource};
use crate::matching::similarity::{self, ScoreResult};
use crate::state::AppState;

/// Characters of extracted resume text echoed back to the caller.
const RESUME_PREVIEW_CHARS: usize = 2000;

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub file_name: Option<String>,
    pub resume_text: String,
    pub job_description: String,
    pub match_score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub feedback: String,
    pub backend_used: FeedbackSource,
    pub model_used: &'static str,
}

/// Extracts resume text on the blocking pool.
pub async fn extract_resume(file_name: String, bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || extract_text(&file_name, &bytes))
        .await
        .map_err(|e| AppError::Extraction(format!("Failed to extract text: {e}")))??;
    Ok(text)
}

/// Scores `resume_text` against `job_description` and generates feedback.
pub async fn run_match(
    state: &AppState,
    file_name: Option<String>,
    resume_text: String,
    job_description: String,
) -> Result<MatchReport, AppError> {
    let scored =
        score_on_blocking_pool(state, resume_text.clone(), job_description.clone()).await?;
    info!(
        "Match score {} ({} matched, {} missing)",
        scored.score,
        scored.matched.len(),
        scored.missing.len()
    );

    let feedback = generate_feedback(state, &scored).await;

    Ok(MatchReport {
        file_name,
        resume_text: resume_text.chars().take(RESUME_PREVIEW_CHARS).collect(),
        job_description,
        match_score: scored.score,
        matched: scored.matched,
        missing: scored.missing,
        feedback: feedback.text,
        backend_used: feedback.backend_used,
        model_used: feedback.backend_used.label(),
    })
}

async fn score_on_blocking_pool(
    state: &AppState,
    resume_text: String,
    job_description: String,
) -> Result<ScoreResult, AppError> {
    let models = state.models.clone();
    let model_name = state.config.embedding_model.clone();

    let result = tokio::task::spawn_blocking(move || {
        let model = models.get_model(&model_name)?;
        debug!("Scoring with embedding model '{}'", model.name());
        similarity::score(&resume_text, &job_description, &model)
    })
    .await
    .map_err(|e| AppError::Scoring(format!("Similarity computation failed: {e}")))??;

    Ok(result)
}

/// Runs the feedback chain in its own task so a panic inside a backend
/// still leaves the caller with feedback text.
async fn generate_feedback(state: &AppState, scored: &ScoreResult) -> FeedbackResult {
    let generator = state.feedback.clone();
    let matched = scored.matched.clone();
    let missing = scored.missing.clone();
    let score = scored.score;

    match tokio::spawn(async move { generator.generate(&matched, &missing, score).await }).await {
        Ok(result) => result,
        Err(e) => {
            error!("Feedback task failed: {e}");
            FeedbackResult::error(&e.to_string())
        }
    }
}
