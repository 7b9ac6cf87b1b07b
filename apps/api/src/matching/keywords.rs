//! Keyword extraction and classification against resume text.
//!
//! Matching is plain substring containment on lowercased text: "java" counts as
//! matched in a resume that only mentions "javascript".

/// Characters trimmed from both ends of each job-description token.
const TRIM_CHARS: &[char] = &[',', '.', '(', ')'];

/// Lowercased, punctuation-trimmed whitespace tokens of the job description.
/// Duplicates and order are preserved.
pub fn extract_keywords(job_text: &str) -> Vec<String> {
    job_text
        .split_whitespace()
        .map(|token| token.to_lowercase().trim_matches(TRIM_CHARS).to_string())
        .collect()
}

/// Keywords split by whether the resume contains them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordSplit {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl KeywordSplit {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// Fraction of keywords matched; 0.0 when there are no keywords.
    pub fn keyword_score(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.matched.len() as f64 / total as f64,
        }
    }
}

pub fn classify_keywords(keywords: Vec<String>, resume_text: &str) -> KeywordSplit {
    let resume_lower = resume_text.to_lowercase();
    let (matched, missing): (Vec<String>, Vec<String>) = keywords
        .into_iter()
        .partition(|kw| resume_lower.contains(kw.as_str()));
    KeywordSplit { matched, missing }
}
