//! LLM-backed intent resolver.
//!
//! Renders the system policy and sub-agent schemas into a prompt, asks the
//! model for a single JSON decision, and maps the reply onto [`Resolution`].
//! Anything that is neither a plain clarification nor exactly one
//! well-formed delegation is reported as a contract error.

use crate::resolver::{ContextLine, IntentResolver, Resolution, ResolutionRequest};
use async_trait::async_trait;
use carelink_common::{Arguments, CarelinkError, Result, Speaker};
use carelink_llm::{ChatMessage, LlmClient, LlmConfig, LlmRequest};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default cap on user text forwarded to the model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 10_000;

/// Sampling temperature for every resolver call.
pub const RESOLVER_TEMPERATURE: f32 = 0.1;

const RESPONSE_FORMAT: &str = r#"RESPONSE FORMAT: reply with ONE JSON object and nothing else.

To delegate:
{"action":"delegate","sub_agent":"<exact sub-agent name>","arguments":{"<parameter>":"<string value>"}}

To ask for missing information:
{"action":"clarify","message":"<the question for the user>"}

Argument values must be plain strings. Never include more than one delegation."#;

/// Resolver that asks a chat model for the decision.
pub struct LlmIntentResolver {
    client: Arc<dyn LlmClient>,
    max_tokens: Option<u32>,
    max_input_chars: usize,
}

impl LlmIntentResolver {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            max_tokens: None,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    /// Build from config, taking the token limit from it.
    ///
    /// Temperature stays at [`RESOLVER_TEMPERATURE`] whatever the config says:
    /// the same input must pick the same sub-agent.
    pub fn from_config(client: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        if (config.temperature - RESOLVER_TEMPERATURE).abs() > f32::EPSILON {
            warn!(
                configured = config.temperature,
                used = RESOLVER_TEMPERATURE,
                "Ignoring configured temperature for intent resolution"
            );
        }
        Self {
            max_tokens: config.max_tokens,
            ..Self::new(client)
        }
    }

    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    fn build_request(&self, request: &ResolutionRequest) -> Result<LlmRequest> {
        let schemas: Vec<Value> = request.schemas.iter().map(|s| s.to_json_schema()).collect();
        let system_prompt = format!(
            "{}\n\nSUB-AGENT SCHEMAS:\n{}\n\n{}",
            request.policy,
            serde_json::to_string_pretty(&schemas)?,
            RESPONSE_FORMAT
        );

        let mut messages: Vec<ChatMessage> =
            request.context.iter().map(context_message).collect();
        messages.push(ChatMessage::user(request.user_text.clone()));

        Ok(LlmRequest {
            system_prompt: Some(system_prompt),
            messages,
            temperature: Some(RESOLVER_TEMPERATURE),
            max_tokens: self.max_tokens,
            json_response: true,
        })
    }
}

fn context_message(line: &ContextLine) -> ChatMessage {
    match (line.speaker, &line.sub_agent) {
        (Speaker::User, _) => ChatMessage::user(line.text.clone()),
        (_, Some(agent)) => ChatMessage::assistant(format!("[{agent} result]\n{}", line.text)),
        (_, None) => ChatMessage::assistant(line.text.clone()),
    }
}

#[async_trait]
impl IntentResolver for LlmIntentResolver {
    async fn resolve(&self, request: &ResolutionRequest) -> Result<Resolution> {
        let chars = request.user_text.chars().count();
        if chars > self.max_input_chars {
            return Err(CarelinkError::ResolverContract(format!(
                "Input of {chars} characters exceeds the limit of {}",
                self.max_input_chars
            )));
        }

        debug!(
            model = %self.client.model_name(),
            content_preview = %request.user_text.chars().take(50).collect::<String>(),
            context_lines = request.context.len(),
            "Resolving intent"
        );

        let llm_request = self.build_request(request)?;
        let response = self.client.complete(llm_request).await?;

        debug!(
            response = %response.content.chars().take(200).collect::<String>(),
            "Resolver response"
        );

        let resolution = parse_resolution(&response.content)?;
        match &resolution {
            Resolution::Clarification(_) => info!("Resolver asked for clarification"),
            Resolution::Delegation { sub_agent, arguments } => info!(
                sub_agent = %sub_agent,
                argument_count = arguments.len(),
                "Resolver chose a delegation"
            ),
        }
        Ok(resolution)
    }

    fn name(&self) -> &str {
        "llm"
    }
}

/// Map a raw model reply onto a [`Resolution`].
pub fn parse_resolution(reply: &str) -> Result<Resolution> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(contract("empty reply"));
    }

    // A reply that opens with JSON must be a well-formed decision.
    let strict = trimmed.starts_with(['{', '[']);

    let decision = extract_json_object(trimmed).map(|json_str| serde_json::from_str::<Value>(json_str));

    let parsed = match decision {
        Some(Ok(value)) if strict || is_decision(&value) => value,
        Some(Err(e)) if strict => return Err(contract(&format!("invalid JSON: {e}"))),
        None if strict => return Err(contract("reply is not a complete JSON object")),
        // Prose, possibly with braces in it, is a clarification.
        _ => return Ok(Resolution::Clarification(trimmed.to_string())),
    };
    let obj = parsed
        .as_object()
        .ok_or_else(|| contract("decision is not an object"))?;

    if let Some(list) = obj.get("delegations").or_else(|| obj.get("tool_calls")) {
        return match list.as_array().map(Vec::as_slice) {
            Some([single]) => parse_delegation(single),
            Some(items) => Err(contract(&format!(
                "expected exactly one delegation, got {}",
                items.len()
            ))),
            None => Err(contract("delegation list is not an array")),
        };
    }

    match obj.get("action").and_then(Value::as_str) {
        Some("clarify") => parse_clarification(&parsed),
        Some("delegate") => parse_delegation(&parsed),
        Some(other) => Err(contract(&format!("unknown action \"{other}\""))),
        None if obj.contains_key("sub_agent") => parse_delegation(&parsed),
        None if obj.contains_key("message") => parse_clarification(&parsed),
        None => Err(contract("reply is neither a clarification nor a delegation")),
    }
}

const DECISION_KEYS: &[&str] = &["action", "sub_agent", "message", "delegations", "tool_calls"];

fn is_decision(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| DECISION_KEYS.iter().any(|key| obj.contains_key(*key)))
}

fn parse_clarification(value: &Value) -> Result<Resolution> {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| Resolution::Clarification(m.to_string()))
        .ok_or_else(|| contract("clarification without a message"))
}

fn parse_delegation(value: &Value) -> Result<Resolution> {
    let sub_agent = value
        .get("sub_agent")
        .or_else(|| value.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| contract("delegation without a sub-agent name"))?;

    let arguments = match value.get("arguments").or_else(|| value.get("args")) {
        None | Some(Value::Null) => Arguments::new(),
        Some(Value::Object(map)) => flatten_arguments(map)?,
        Some(_) => return Err(contract("delegation arguments are not an object")),
    };

    Ok(Resolution::Delegation {
        sub_agent: sub_agent.to_string(),
        arguments,
    })
}

/// Scalars become strings, nulls are dropped, nested values are rejected.
fn flatten_arguments(map: &serde_json::Map<String, Value>) -> Result<Arguments> {
    let mut arguments = Arguments::new();
    for (name, value) in map {
        let flat = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                warn!(argument = %name, "Nested argument value in delegation");
                return Err(contract(&format!("argument \"{name}\" is not a flat value")));
            }
        };
        arguments.insert(name.clone(), flat);
    }
    Ok(arguments)
}

fn contract(detail: &str) -> CarelinkError {
    CarelinkError::ResolverContract(detail.to_string())
}

/// Find the first balanced JSON object in `s`, skipping braces inside strings.
fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
