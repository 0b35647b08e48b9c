use std::sync::Arc;
use std::time::Duration;

use carelink_common::{CarelinkError, Result};
use serde::{Deserialize, Serialize};

use crate::anthropic::AnthropicClient;
use crate::client::LlmClient;
use crate::openai::OpenAiClient;
use crate::retry::{RetryConfig, RetryingClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type: "openai" (any OpenAI-compatible endpoint) or "anthropic"
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Kept low: sub-agent selection must be stable for a given input
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl LlmConfig {
    /// Resolve the API key from config or environment variables.
    ///
    /// Priority:
    /// 1. Non-empty `api_key` in config
    /// 2. `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` depending on provider
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }

        let env_var = match self.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            "anthropic" => "ANTHROPIC_API_KEY",
            _ => return None,
        };

        std::env::var(env_var).ok().filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Build the provider client wrapped in the retry layer.
pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let base_client: Box<dyn LlmClient> = match config.provider.as_str() {
        "openai" => Box::new(OpenAiClient::new(
            config.api_url.clone(),
            config.model.clone(),
            config.resolve_api_key(),
            config.timeout(),
        )?),
        "anthropic" => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                CarelinkError::Config(
                    "Anthropic requires an API key (api_key or ANTHROPIC_API_KEY)".to_string(),
                )
            })?;
            Box::new(AnthropicClient::new(
                config.api_url.clone(),
                config.model.clone(),
                api_key,
                config.timeout(),
            )?)
        }
        other => {
            return Err(CarelinkError::Config(format!(
                "Unknown LLM provider: {other}"
            )));
        }
    };

    Ok(Arc::new(RetryingClient::new(base_client, config.retry.clone())))
}
