//! Feedback Generation — turns a score and keyword split into a short written review.
//!
//! Backends are tried in a fixed order, each stage terminal unless it fails:
//!
//! ```text
//! Primary (OpenAI) ──fail/skip──▶ Secondary (Hugging Face) ──fail/skip──▶ Offline
//! ```
//!
//! A remote stage is skipped when its credential is not configured. Offline never
//! fails, so `FeedbackGenerator::generate` always returns a result.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::llm_client::huggingface::HuggingFaceClient;
use crate::llm_client::openai::OpenAiClient;
use crate::llm_client::LlmError;

mod backends;
pub mod offline;
pub mod prompts;

pub use offline::render_offline_feedback;

pub const MAX_FEEDBACK_CHARS: usize = 600;

/// Which backend produced the feedback text.
/// `Error` is only ever assigned by callers that could not run the generator at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackSource {
    Primary,
    Secondary,
    Offline,
    Error,
}

impl FeedbackSource {
    /// Human-facing name of the engine behind this source.
    pub fn label(self) -> &'static str {
        match self {
            FeedbackSource::Primary => "OpenAI",
            FeedbackSource::Secondary => "HuggingFace",
            FeedbackSource::Offline => "Offline",
            FeedbackSource::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResult {
    pub text: String,
    pub backend_used: FeedbackSource,
}

impl FeedbackResult {
    fn new(text: &str, backend_used: FeedbackSource) -> Self {
        Self {
            text: truncate_feedback(text),
            backend_used,
        }
    }

    /// Diagnostic result for when the generator itself could not run.
    pub fn error(reason: &str) -> Self {
        Self::new(
            &format!("Feedback generation failed: {reason}"),
            FeedbackSource::Error,
        )
    }
}

/// Inputs shared by every backend.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackRequest<'a> {
    pub matched: &'a [String],
    pub missing: &'a [String],
    pub score: f64,
}

/// A remote text-generation service that can write feedback.
#[async_trait]
pub trait FeedbackBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &FeedbackRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Primary,
    Secondary,
    Offline,
}

impl Stage {
    /// Stage entered when this one is skipped or fails.
    fn next(self) -> Stage {
        match self {
            Stage::Primary => Stage::Secondary,
            Stage::Secondary | Stage::Offline => Stage::Offline,
        }
    }

    fn source(self) -> FeedbackSource {
        match self {
            Stage::Primary => FeedbackSource::Primary,
            Stage::Secondary => FeedbackSource::Secondary,
            Stage::Offline => FeedbackSource::Offline,
        }
    }
}

pub struct FeedbackGenerator {
    primary: Option<Arc<dyn FeedbackBackend>>,
    secondary: Option<Arc<dyn FeedbackBackend>>,
    timeout: Duration,
}

impl FeedbackGenerator {
    pub fn new(
        primary: Option<Arc<dyn FeedbackBackend>>,
        secondary: Option<Arc<dyn FeedbackBackend>>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            timeout,
        }
    }

    /// Wires up a remote backend for each credential present in `config`.
    pub fn from_config(config: &Config) -> Self {
        let primary = config.openai_api_key.clone().map(|key| {
            Arc::new(OpenAiClient::new(key, config.openai_api_url.clone()))
                as Arc<dyn FeedbackBackend>
        });
        let secondary = config.hf_api_key.clone().map(|key| {
            Arc::new(HuggingFaceClient::new(key, config.hf_api_url.clone()))
                as Arc<dyn FeedbackBackend>
        });
        Self::new(primary, secondary, config.feedback_timeout)
    }

    /// Names of the remote backends that will be attempted, in order.
    pub fn remote_backends(&self) -> Vec<&'static str> {
        [&self.primary, &self.secondary]
            .into_iter()
            .flatten()
            .map(|b| b.name())
            .collect()
    }

    pub async fn generate(
        &self,
        matched: &[String],
        missing: &[String],
        score: f64,
    ) -> FeedbackResult {
        let request = FeedbackRequest {
            matched,
            missing,
            score,
        };

        let mut stage = Stage::Primary;
        loop {
            let backend = match stage {
                Stage::Primary => self.primary.as_ref(),
                Stage::Secondary => self.secondary.as_ref(),
                Stage::Offline => {
                    info!("Feedback generated by offline template");
                    let text = render_offline_feedback(matched, missing, score);
                    return FeedbackResult::new(&text, FeedbackSource::Offline);
                }
            };

            let Some(backend) = backend else {
                debug!("No credential for {stage:?} feedback backend, skipping");
                stage = stage.next();
                continue;
            };

            match self.attempt(backend.as_ref(), &request).await {
                Ok(text) => {
                    info!("Feedback generated by {}", backend.name());
                    return FeedbackResult::new(&text, stage.source());
                }
                Err(e) => {
                    warn!(
                        "{} feedback failed, falling back to {:?}: {e}",
                        backend.name(),
                        stage.next()
                    );
                    stage = stage.next();
                }
            }
        }
    }

    async fn attempt(
        &self,
        backend: &dyn FeedbackBackend,
        request: &FeedbackRequest<'_>,
    ) -> Result<String, LlmError> {
        let text = tokio::time::timeout(self.timeout, backend.generate(request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))??;

        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.trim().to_string())
    }
}

/// Caps feedback at `MAX_FEEDBACK_CHARS` characters (not bytes).
pub fn truncate_feedback(text: &str) -> String {
    text.chars().take(MAX_FEEDBACK_CHARS).collect()
}
