use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use glimpse_core::config::{AuthScheme, ProviderConfig, ProviderKind};
use glimpse_core::error::{GlimpseError, Result};
use glimpse_core::VisionProvider;

mod anthropic;
mod openrouter;

pub use anthropic::AnthropicProvider;
pub use openrouter::OpenRouterProvider;

pub(crate) const MAX_TOKENS: u32 = 4096;

/// Build the client for one configured provider.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn VisionProvider>> {
    let provider: Arc<dyn VisionProvider> = match config.kind {
        ProviderKind::OpenRouter => Arc::new(OpenRouterProvider::new(config.clone())?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config.clone())?),
    };
    Ok(provider)
}

fn http_client(config: &ProviderConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(GlimpseError::from)
}

fn with_auth(builder: RequestBuilder, config: &ProviderConfig) -> RequestBuilder {
    let builder = match config.auth {
        AuthScheme::Bearer => builder.bearer_auth(&config.api_key),
        AuthScheme::ApiKeyHeader => builder.header("x-api-key", &config.api_key),
    };
    config
        .extra_headers
        .iter()
        .fold(builder, |b, (name, value)| b.header(name.as_str(), value.as_str()))
}

/// Pull a readable message out of a provider error body: `error.message`,
/// then a top-level `message`, then a generic line with the status code.
pub(crate) fn error_message(provider: &str, status: StatusCode, body: &str) -> String {
    let fallback = format!("{provider} API failed with status {}", status.as_u16());

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback;
    };

    value
        .pointer("/error/message")
        .and_then(|m| m.as_str())
        .or_else(|| value.get("message").and_then(|m| m.as_str()))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or(fallback)
}

/// POST a JSON body to the provider endpoint and decode the JSON reply.
/// Transport failures, timeouts and non-success statuses all come back as
/// [`GlimpseError::Provider`].
pub(crate) async fn post_json<B, R>(client: &Client, config: &ProviderConfig, body: &B) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let id = config.kind.id();
    let display = config.kind.display_name();

    let response = with_auth(client.post(&config.endpoint), config)
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| GlimpseError::provider(id, format!("{display} request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        tracing::debug!(provider = id, %status, body_len = body.len(), "Provider returned error status");
        return Err(GlimpseError::provider(id, error_message(display, status, &body)));
    }

    response
        .json()
        .await
        .map_err(|e| GlimpseError::provider(id, format!("Failed to parse {display} response: {e}")))
}
