use std::sync::Arc;

use glimpse_core::config::AppConfig;
use glimpse_core::error::{GlimpseError, Result};
use glimpse_core::{ImageInput, VisionProvider};

use crate::providers::build_provider;

pub const NO_PROVIDER_MESSAGE: &str =
    "No API key configured for vision extraction. Set OPENROUTER_API_KEY or ANTHROPIC_API_KEY.";

/// Vision providers in priority order. Each one is only tried after the
/// previous one failed or produced no text.
pub struct ProviderChain {
    providers: Vec<Arc<dyn VisionProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn VisionProvider>>) -> Self {
        Self { providers }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = config
            .providers()
            .iter()
            .map(build_provider)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(providers))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Returns the first non-empty text produced by a provider.
    ///
    /// Intermediate failures are logged and dropped. When every provider has
    /// been tried the error depends on what happened last: the last
    /// provider's own error if it failed, otherwise
    /// [`GlimpseError::NoTextExtracted`]. With no providers at all nothing is
    /// called and [`GlimpseError::Config`] is returned.
    pub async fn extract(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        if self.providers.is_empty() {
            tracing::error!("No vision provider configured");
            return Err(GlimpseError::Config(NO_PROVIDER_MESSAGE.to_string()));
        }

        let mut last_error = None;

        for (position, provider) in self.providers.iter().enumerate() {
            let remaining = self.providers.len() - position - 1;

            match provider.invoke(image, prompt).await {
                Ok(text) if !text.is_empty() => {
                    tracing::info!(
                        provider = provider.name(),
                        response_len = text.len(),
                        "Vision provider returned text"
                    );
                    return Ok(text);
                }
                Ok(_) => {
                    tracing::warn!(
                        provider = provider.name(),
                        remaining,
                        "Vision provider returned no text"
                    );
                    last_error = None;
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        remaining,
                        error = %e,
                        "Vision provider failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(GlimpseError::NoTextExtracted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;

    fn image() -> ImageInput {
        ImageInput::new("aGVsbG8=", "image/png")
    }

    fn chain(providers: &[&MockProvider]) -> ProviderChain {
        ProviderChain::new(providers.iter().map(|p| (*p).clone().into_shared()).collect())
    }

    #[tokio::test]
    async fn empty_chain_is_a_configuration_error() {
        let err = ProviderChain::new(Vec::new())
            .extract(&image(), "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, GlimpseError::Config(_)));
        assert_eq!(err.to_string(), NO_PROVIDER_MESSAGE);
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let primary = MockProvider::replying("openrouter", "post text");
        let secondary = MockProvider::replying("anthropic", "unused");

        let text = chain(&[&primary, &secondary])
            .extract(&image(), "prompt")
            .await
            .unwrap();

        assert_eq!(text, "post text");
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn failing_primary_falls_back_silently() {
        let primary = MockProvider::failing("openrouter", "upstream 503");
        let secondary = MockProvider::replying("anthropic", "hello");

        let text = chain(&[&primary, &secondary])
            .extract(&image(), "prompt")
            .await
            .unwrap();

        assert_eq!(text, "hello");
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
        assert_eq!(secondary.prompts(), vec!["prompt".to_string()]);
    }

    #[tokio::test]
    async fn empty_primary_falls_back() {
        let primary = MockProvider::replying("openrouter", "");
        let secondary = MockProvider::replying("anthropic", "from secondary");

        let text = chain(&[&primary, &secondary])
            .extract(&image(), "prompt")
            .await
            .unwrap();
        assert_eq!(text, "from secondary");
    }

    #[tokio::test]
    async fn last_provider_error_is_surfaced() {
        let primary = MockProvider::failing("openrouter", "primary down");
        let secondary = MockProvider::failing("anthropic", "Invalid API key");

        let err = chain(&[&primary, &secondary])
            .extract(&image(), "prompt")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid API key");
        match err {
            GlimpseError::Provider { provider, .. } => assert_eq!(provider, "anthropic"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_failing_provider_surfaces_its_error() {
        let only = MockProvider::failing("openrouter", "quota exceeded");
        let err = chain(&[&only])
            .extract(&image(), "prompt")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test]
    async fn all_empty_is_no_text() {
        let primary = MockProvider::replying("openrouter", "");
        let secondary = MockProvider::replying("anthropic", "");

        let err = chain(&[&primary, &secondary])
            .extract(&image(), "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, GlimpseError::NoTextExtracted));
    }

    #[tokio::test]
    async fn empty_last_reply_clears_earlier_failure() {
        let primary = MockProvider::failing("openrouter", "primary down");
        let secondary = MockProvider::replying("anthropic", "");

        let err = chain(&[&primary, &secondary])
            .extract(&image(), "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, GlimpseError::NoTextExtracted));
    }

    #[test]
    fn from_config_builds_in_priority_order() {
        let config = AppConfig {
            openrouter_api_key: "or".into(),
            anthropic_api_key: "an".into(),
            ..AppConfig::default()
        };
        let chain = ProviderChain::from_config(&config).unwrap();
        assert_eq!(chain.provider_names(), vec!["openrouter", "anthropic"]);

        assert!(ProviderChain::from_config(&AppConfig::default())
            .unwrap()
            .is_empty());
    }
}
