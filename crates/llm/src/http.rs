//! Shared HTTP plumbing for the provider clients.

use carelink_common::{CarelinkError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CarelinkError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Send a request and decode a JSON reply, classifying every failure.
///
/// Timeouts and connection failures become `ResolverTransport`, non-2xx
/// replies become `LlmStatus`, and undecodable bodies are transport errors
/// too because the remote service produced them.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<T> {
    let response = request.send().await.map_err(|e| {
        let kind = if e.is_timeout() { "timed out" } else { "failed" };
        CarelinkError::ResolverTransport(format!("{provider} request {kind}: {e}"))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CarelinkError::LlmStatus {
            status: status.as_u16(),
            body,
        });
    }

    response.json().await.map_err(|e| {
        CarelinkError::ResolverTransport(format!("Failed to parse {provider} response: {e}"))
    })
}
