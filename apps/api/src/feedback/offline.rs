use super::prompts::join_first;
use super::truncate_feedback;

const OFFLINE_KEYWORD_LIMIT: usize = 5;

/// Deterministic feedback built without any network call.
pub fn render_offline_feedback(matched: &[String], missing: &[String], score: f64) -> String {
    let feedback = format!(
        "Your resume matches {score}% of key job requirements. \
         You've covered strengths in areas such as {}. \
         Consider improving sections like {}. \
         Tailor your resume to emphasize relevant keywords and measurable results.",
        join_first(matched, OFFLINE_KEYWORD_LIMIT),
        join_first(missing, OFFLINE_KEYWORD_LIMIT),
    );
    truncate_feedback(&feedback)
}
