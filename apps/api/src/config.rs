use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::{self, ModelConfig};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub dashscope_api_key: String,
    pub llm_base_url: String,
    pub default_model: String,
    pub llm_temperature: f32,
    pub llm_timeout: Duration,
    pub dictionary_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| llm_client::DEFAULT_MODEL.to_string());
        if !llm_client::is_available_model(&default_model) {
            bail!("DEFAULT_MODEL '{default_model}' is not one of the available models");
        }

        Ok(Config {
            dashscope_api_key: require_env("DASHSCOPE_API_KEY")?,
            llm_base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| llm_client::DEFAULT_BASE_URL.to_string()),
            default_model,
            llm_temperature: std::env::var("LLM_TEMPERATURE")
                .unwrap_or_else(|_| "0.1".to_string())
                .parse::<f32>()
                .context("LLM_TEMPERATURE must be a number")?,
            llm_timeout: Duration::from_secs(
                std::env::var("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            dictionary_dir: std::env::var("DICTIONARY_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Model settings for a request, falling back to the configured default model.
    pub fn model_config(&self, model: Option<&str>) -> ModelConfig {
        ModelConfig {
            model: model.unwrap_or(&self.default_model).to_string(),
            temperature: self.llm_temperature,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
impl Config {
    /// Config for tests; never touches the process environment.
    pub fn for_tests(dictionary_dir: impl Into<PathBuf>) -> Self {
        Config {
            dashscope_api_key: "test-key".to_string(),
            llm_base_url: "http://127.0.0.1:0".to_string(),
            default_model: llm_client::DEFAULT_MODEL.to_string(),
            llm_temperature: 0.1,
            llm_timeout: Duration::from_secs(5),
            dictionary_dir: dictionary_dir.into(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
