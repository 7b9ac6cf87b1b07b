use std::sync::Arc;

use crate::config::Config;
use crate::embedding::ModelRegistry;
use crate::feedback::FeedbackGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Process-wide embedding model cache. Lazily populated, never evicted.
    pub models: Arc<ModelRegistry>,
    /// Primary → Secondary → Offline feedback chain, built from the configured credentials.
    pub feedback: Arc<FeedbackGenerator>,
}

#[cfg(test)]
impl AppState {
    /// State with no remote credentials and a deterministic in-process embedder.
    pub(crate) fn offline_for_tests() -> Self {
        use std::time::Duration;

        let config = Config {
            openai_api_key: None,
            openai_api_url: String::new(),
            hf_api_key: None,
            hf_api_url: String::new(),
            embedding_model: crate::embedding::DEFAULT_MODEL.to_string(),
            model_cache_dir: None,
            feedback_timeout: Duration::from_secs(5),
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "info".to_string(),
        };
        let feedback = FeedbackGenerator::from_config(&config);

        Self {
            config,
            models: crate::embedding::testing::hashing_registry(),
            feedback: Arc::new(feedback),
        }
    }
}
