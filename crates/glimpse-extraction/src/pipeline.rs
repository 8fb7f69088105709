use glimpse_core::api_types::{OcrOutcome, OcrRequest};
use glimpse_core::config::AppConfig;
use glimpse_core::error::Result;
use glimpse_core::{Extraction, ExtractionRequest};

use crate::chain::ProviderChain;
use crate::prompts;

/// Screenshot text extraction: validation, prompt selection, provider
/// fallback and normalization of the model output.
pub struct OcrPipeline {
    chain: ProviderChain,
}

impl OcrPipeline {
    pub fn new(chain: ProviderChain) -> Self {
        Self { chain }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(ProviderChain::from_config(config)?))
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.chain.provider_names()
    }

    /// Runs one request end to end. Never fails: every error is folded into
    /// the returned outcome.
    pub async fn run(&self, request: OcrRequest) -> OcrOutcome {
        let extraction = match request.validate() {
            Ok(request) => self.extract(&request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected OCR request");
                Err(e)
            }
        };

        match extraction {
            Ok(extraction) => extraction.into(),
            Err(e) => OcrOutcome::from_error(&e),
        }
    }

    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Extraction> {
        let strategy = prompts::resolve(request.mode);

        tracing::info!(
            mode = %strategy.mode,
            media_type = %request.image.media_type,
            image_len = request.image.data_base64.len(),
            "Starting screenshot extraction"
        );

        let raw = self.chain.extract(&request.image, strategy.prompt).await?;
        let extraction = strategy.normalize(&raw);

        tracing::info!(mode = %extraction.mode(), raw_len = raw.len(), "Extraction complete");
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_core::{OutcomeStatus, PostExtraction};

    use crate::testing::MockProvider;

    fn pipeline(providers: &[&MockProvider]) -> OcrPipeline {
        OcrPipeline::new(ProviderChain::new(
            providers.iter().map(|p| (*p).clone().into_shared()).collect(),
        ))
    }

    fn request(mode: &str) -> OcrRequest {
        OcrRequest {
            image_base64: Some("aGVsbG8=".into()),
            media_type: Some("image/png".into()),
            mode: Some(mode.into()),
        }
    }

    #[tokio::test]
    async fn invalid_mode_makes_no_calls() {
        let provider = MockProvider::replying("openrouter", "text");
        let outcome = pipeline(&[&provider]).run(request("story")).await;

        assert_eq!(outcome.status, OutcomeStatus::InvalidRequest);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn post_mode_sends_post_prompt() {
        let provider = MockProvider::replying("openrouter", "  Hello LinkedIn  ");
        let p = pipeline(&[&provider]);
        let req = request("post").validate().unwrap();

        let extraction = p.extract(&req).await.unwrap();
        assert_eq!(
            extraction,
            Extraction::Post(PostExtraction::Text("Hello LinkedIn".into()))
        );
        assert_eq!(provider.prompts(), vec![prompts::POST_EXTRACTION_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn profile_mode_sends_profile_prompt() {
        let provider = MockProvider::replying("anthropic", r#"{"headline": "CTO"}"#);
        let outcome = pipeline(&[&provider]).run(request("profile")).await;

        assert!(outcome.is_success());
        assert_eq!(
            provider.prompts(),
            vec![prompts::PROFILE_EXTRACTION_PROMPT.to_string()]
        );
    }
}
