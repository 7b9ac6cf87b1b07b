use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::embedding::DEFAULT_MODEL;
use crate::llm_client::{huggingface, openai};

/// Application configuration loaded from environment variables.
/// Both feedback credentials are optional; an absent key disables that backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub hf_api_key: Option<String>,
    pub hf_api_url: String,
    pub embedding_model: String,
    pub model_cache_dir: Option<PathBuf>,
    pub feedback_timeout: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_api_url: optional_env("OPENAI_API_URL")
                .unwrap_or_else(|| openai::DEFAULT_API_URL.to_string()),
            hf_api_key: optional_env("HF_API_KEY"),
            hf_api_url: optional_env("HF_API_URL")
                .unwrap_or_else(|| huggingface::DEFAULT_API_URL.to_string()),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_cache_dir: optional_env("MODEL_CACHE_DIR").map(PathBuf::from),
            feedback_timeout: Duration::from_secs(parse_env("FEEDBACK_TIMEOUT_SECS", 20)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
