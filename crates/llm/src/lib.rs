//! LLM transport for the Carelink intent resolver.
//!
//! The resolver only needs a single chat completion per turn, so this crate
//! keeps to one trait (`LlmClient`), two providers, and a retry wrapper.

pub mod anthropic;
pub mod client;
pub mod config;
mod http;
pub mod openai;
pub mod retry;

pub use anthropic::AnthropicClient;
pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{build_llm_client, LlmConfig};
pub use openai::OpenAiClient;
pub use retry::{RetryConfig, RetryingClient};
