/// LLM Client — HTTP plumbing shared by the remote feedback providers.
///
/// Both providers speak JSON over HTTPS with a bearer credential. This module owns
/// the retry loop and error classification; `openai` and `huggingface` own the
/// provider-specific request and response shapes.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod huggingface;
pub mod openai;

const MAX_RETRIES: u32 = 2;
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Builds the HTTP client shared by provider clients.
pub(crate) fn build_http_client() -> Client {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {e}");
            Client::new()
        })
}

/// POSTs `body` as JSON with a bearer token and decodes the JSON response.
/// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
pub(crate) async fn post_json<B, T>(
    client: &Client,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<T, LlmError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1s, ...
            let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = client
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let text = response.text().await?;
        return serde_json::from_str(&text).map_err(LlmError::Parse);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: MAX_RETRIES,
    }))
}

/// Pulls a readable message out of a provider error body.
/// OpenAI nests it (`{"error": {"message": ..}}`), Hugging Face does not (`{"error": ".."}`).
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    match error {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(nested) => nested
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| body.to_string()),
        None => body.to_string(),
    }
}

/// Serves `router` on an ephemeral localhost port and returns its base URL.
#[cfg(test)]
pub(crate) async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_nested_openai_shape() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
    }

    #[test]
    fn test_error_message_flat_huggingface_shape() {
        let body = r#"{"error": "Model gpt2 is currently loading", "estimated_time": 20.0}"#;
        assert_eq!(error_message(body), "Model gpt2 is currently loading");
    }

    #[test]
    fn test_error_message_non_json_body_passes_through() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
