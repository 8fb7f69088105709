use std::fmt;

use serde::{Deserialize, Serialize};

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const OPENROUTER_MODEL: &str = "anthropic/claude-sonnet-4";
pub const ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250514";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenRouter,
    Anthropic,
}

impl ProviderKind {
    /// Stable identifier used in logs and the health endpoint.
    pub fn id(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::Anthropic => "anthropic",
        }
    }

    /// Human-readable name used in fallback error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenRouter => "OpenRouter",
            Self::Anthropic => "Anthropic",
        }
    }
}

/// How the API key is presented to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>`
    ApiKeyHeader,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: String,
    pub auth: AuthScheme,
    pub model: String,
    /// Lower runs first. Fixed once the config is built.
    pub priority: u8,
    pub api_key: String,
    pub timeout_seconds: u64,
    #[serde(default)]
    pub extra_headers: Vec<(String, String)>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("auth", &self.auth)
            .field("model", &self.model)
            .field("priority", &self.priority)
            .field("api_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("extra_headers", &self.extra_headers)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub openrouter_api_key: String,
    pub openrouter_api_url: String,
    pub openrouter_model: String,
    pub openrouter_referer: String,
    pub openrouter_title: String,
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub anthropic_model: String,
    pub provider_timeout_seconds: u64,
    /// Upper bound on request bodies; screenshots arrive base64 encoded.
    pub max_request_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 8080,
            openrouter_api_key: String::new(),
            openrouter_api_url: OPENROUTER_API_URL.into(),
            openrouter_model: OPENROUTER_MODEL.into(),
            openrouter_referer: "https://roastmypost.ai".into(),
            openrouter_title: "RoastMyPost AI".into(),
            anthropic_api_key: String::new(),
            anthropic_api_url: ANTHROPIC_API_URL.into(),
            anthropic_model: ANTHROPIC_MODEL.into(),
            provider_timeout_seconds: 120,
            max_request_bytes: 20 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.server_port),
            openrouter_api_key: std::env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            openrouter_api_url: std::env::var("OPENROUTER_API_URL")
                .unwrap_or(defaults.openrouter_api_url),
            openrouter_model: std::env::var("OPENROUTER_MODEL").unwrap_or(defaults.openrouter_model),
            openrouter_referer: std::env::var("OPENROUTER_REFERER")
                .unwrap_or(defaults.openrouter_referer),
            openrouter_title: std::env::var("OPENROUTER_TITLE").unwrap_or(defaults.openrouter_title),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.is_empty())
                .or_else(|| std::env::var("LYZR_ANTHROPIC_KEY").ok())
                .unwrap_or_default(),
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or(defaults.anthropic_api_url),
            anthropic_model: std::env::var("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            provider_timeout_seconds: std::env::var("PROVIDER_TIMEOUT_SECONDS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.provider_timeout_seconds),
            max_request_bytes: std::env::var("MAX_REQUEST_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_request_bytes),
        }
    }

    /// Configured vision providers in the order they should be tried.
    /// Providers without an API key are left out.
    pub fn providers(&self) -> Vec<ProviderConfig> {
        let mut providers = Vec::new();

        if !self.openrouter_api_key.is_empty() {
            providers.push(ProviderConfig {
                kind: ProviderKind::OpenRouter,
                endpoint: self.openrouter_api_url.clone(),
                auth: AuthScheme::Bearer,
                model: self.openrouter_model.clone(),
                priority: 0,
                api_key: self.openrouter_api_key.clone(),
                timeout_seconds: self.provider_timeout_seconds,
                extra_headers: vec![
                    ("HTTP-Referer".into(), self.openrouter_referer.clone()),
                    ("X-Title".into(), self.openrouter_title.clone()),
                ],
            });
        }

        if !self.anthropic_api_key.is_empty() {
            providers.push(ProviderConfig {
                kind: ProviderKind::Anthropic,
                endpoint: self.anthropic_api_url.clone(),
                auth: AuthScheme::ApiKeyHeader,
                model: self.anthropic_model.clone(),
                priority: 1,
                api_key: self.anthropic_api_key.clone(),
                timeout_seconds: self.provider_timeout_seconds,
                extra_headers: vec![("anthropic-version".into(), "2023-06-01".into())],
            });
        }

        providers.sort_by_key(|p| p.priority);
        providers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keys_means_no_providers() {
        let config = AppConfig::default();
        assert!(config.providers().is_empty());
    }

    #[test]
    fn openrouter_runs_before_anthropic() {
        let config = AppConfig {
            openrouter_api_key: "or-key".into(),
            anthropic_api_key: "an-key".into(),
            ..AppConfig::default()
        };
        let kinds: Vec<_> = config.providers().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ProviderKind::OpenRouter, ProviderKind::Anthropic]);
    }

    #[test]
    fn single_anthropic_provider() {
        let config = AppConfig {
            anthropic_api_key: "an-key".into(),
            ..AppConfig::default()
        };
        let providers = config.providers();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].kind, ProviderKind::Anthropic);
        assert_eq!(providers[0].auth, AuthScheme::ApiKeyHeader);
        assert_eq!(providers[0].endpoint, ANTHROPIC_API_URL);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = AppConfig {
            openrouter_api_key: "sk-or-secret".into(),
            ..AppConfig::default()
        };
        let rendered = format!("{:?}", config.providers()[0]);
        assert!(!rendered.contains("sk-or-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
