// Resume ↔ job description matching.
// Keyword extraction, combined keyword/semantic scoring, and the per-request pipeline.

pub mod handlers;
pub mod keywords;
pub mod pipeline;
pub mod similarity;
