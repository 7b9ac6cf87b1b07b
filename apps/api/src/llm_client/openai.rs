//! Primary feedback provider: OpenAI chat completions.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_http_client, post_json, LlmError};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The chat model used for resume feedback.
pub const MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 256;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Trimmed content of the first choice, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: build_http_client(),
            api_key,
            api_url,
        }
    }

    /// Sends `prompt` as a single user message and returns the completion text.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
        };

        let response: ChatResponse =
            post_json(&self.client, &self.api_url, &self.api_key, &request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "OpenAI call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        response
            .text()
            .map(String::from)
            .ok_or(LlmError::EmptyContent)
    }
}
