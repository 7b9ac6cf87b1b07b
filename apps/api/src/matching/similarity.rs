//! Similarity Scorer — blends keyword overlap with embedding similarity.
//!
//! Algorithm:
//! 1. keywords = job description tokens, lowercased and trimmed of `,.()`
//! 2. matched/missing by substring containment in the lowercased resume
//! 3. keyword_score = |matched| / |keywords| (0 when there are none)
//! 4. semantic_score = cosine(encode(resume), encode(job))
//! 5. score = round((0.6 × keyword_score + 0.4 × semantic_score) × 100, 2), clamped to [0, 100]

use serde::Serialize;

use crate::embedding::{cosine_similarity, encode, EmbeddingError, ModelHandle};
use crate::matching::keywords::{classify_keywords, extract_keywords};

pub const KEYWORD_WEIGHT: f64 = 0.6;
pub const SEMANTIC_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Combined score as a percentage, two decimal places.
    pub score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// Scores a resume against a job description.
///
/// Blocking: encodes both texts with the given model.
pub fn score(
    resume_text: &str,
    job_text: &str,
    model: &ModelHandle,
) -> Result<ScoreResult, EmbeddingError> {
    let split = classify_keywords(extract_keywords(job_text), resume_text);

    let resume_embedding = encode(resume_text, model)?;
    let job_embedding = encode(job_text, model)?;
    let semantic_score = cosine_similarity(&resume_embedding, &job_embedding) as f64;

    Ok(ScoreResult {
        score: combine_scores(split.keyword_score(), semantic_score),
        matched: split.matched,
        missing: split.missing,
    })
}

/// Weighted blend as a percentage rounded to two decimals, clamped to [0, 100].
pub fn combine_scores(keyword_score: f64, semantic_score: f64) -> f64 {
    let blended = (keyword_score * KEYWORD_WEIGHT + semantic_score * SEMANTIC_WEIGHT) * 100.0;
    let rounded = (blended * 100.0).round() / 100.0;
    // -0.0 would render as "-0" in feedback text
    rounded.clamp(0.0, 100.0) + 0.0
}
