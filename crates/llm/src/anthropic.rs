use async_trait::async_trait;
use carelink_common::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::client::{LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
use crate::http::{build_http_client, send_json};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Serialize, Debug, Clone)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
    model: String,
    usage: Option<AnthropicUsage>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

pub struct AnthropicClient {
    api_url: String,
    model: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(
        api_url: Option<String>,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_url: api_url.unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
            model,
            api_key,
            http_client: build_http_client(timeout)?,
        })
    }

    fn build_body(&self, request: &LlmRequest) -> AnthropicRequest {
        // System turns go in the top-level field, not the message list.
        let messages = request
            .messages
            .iter()
            .filter_map(|msg| {
                let role = match msg.role {
                    Role::System => return None,
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                Some(AnthropicMessage {
                    role,
                    content: msg.content.clone(),
                })
            })
            .collect();

        AnthropicRequest {
            model: self.model.clone(),
            messages,
            system: request.system_prompt.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let body = self.build_body(&request);

        let http_req = self
            .http_client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let response: AnthropicResponse = send_json(http_req, "Anthropic").await?;

        let content = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(LlmResponse {
            content,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            }),
            finish_reason: response.stop_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
