use async_trait::async_trait;

use super::prompts::{build_primary_prompt, build_secondary_prompt};
use super::{FeedbackBackend, FeedbackRequest};
use crate::llm_client::huggingface::HuggingFaceClient;
use crate::llm_client::openai::OpenAiClient;
use crate::llm_client::LlmError;

#[async_trait]
impl FeedbackBackend for OpenAiClient {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn generate(&self, request: &FeedbackRequest<'_>) -> Result<String, LlmError> {
        let prompt = build_primary_prompt(request.matched, request.missing, request.score);
        self.complete(&prompt).await
    }
}

#[async_trait]
impl FeedbackBackend for HuggingFaceClient {
    fn name(&self) -> &'static str {
        "HuggingFace"
    }

    async fn generate(&self, request: &FeedbackRequest<'_>) -> Result<String, LlmError> {
        let inputs = build_secondary_prompt(request.matched, request.missing, request.score);
        HuggingFaceClient::generate(self, &inputs).await
    }
}
