//! Secondary feedback provider: Hugging Face hosted text generation.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{build_http_client, post_json, LlmError};

pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models/gpt2";

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
}

/// One entry of the completion array returned by the inference API.
#[derive(Debug, Deserialize)]
pub struct Generation {
    pub generated_text: String,
}

#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl HuggingFaceClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: build_http_client(),
            api_key,
            api_url,
        }
    }

    /// Returns the first generated continuation for `inputs`.
    pub async fn generate(&self, inputs: &str) -> Result<String, LlmError> {
        let generations: Vec<Generation> = post_json(
            &self.client,
            &self.api_url,
            &self.api_key,
            &GenerationRequest { inputs },
        )
        .await?;

        generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}
