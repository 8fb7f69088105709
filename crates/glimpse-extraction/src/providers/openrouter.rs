use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use glimpse_core::config::ProviderConfig;
use glimpse_core::error::Result;
use glimpse_core::{ImageInput, VisionProvider};

use super::{http_client, post_json, MAX_TOKENS};

/// OpenRouter chat completions (OpenAI-compatible) with an inline image.
pub struct OpenRouterProvider {
    client: Client,
    config: ProviderConfig,
}

// ── OpenAI-compatible chat completion request/response types ──────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// `choices[0].message.content`, or empty when any step is missing.
    fn into_text(self) -> String {
        self.choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

impl OpenRouterProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(&config)?,
            config,
        })
    }

    fn build_request<'a>(&'a self, image: &ImageInput, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            max_tokens: MAX_TOKENS,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                        },
                    },
                    ContentPart::Text { text: prompt },
                ],
            }],
        }
    }
}

#[async_trait]
impl VisionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        self.config.kind.id()
    }

    async fn invoke(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        let request = self.build_request(image, prompt);

        tracing::debug!(
            model = %self.config.model,
            media_type = %image.media_type,
            image_len = image.data_base64.len(),
            "Sending vision request to OpenRouter"
        );

        let response: ChatResponse = post_json(&self.client, &self.config, &request).await?;
        let text = response.into_text();

        tracing::debug!(response_len = text.len(), "Received OpenRouter response");
        Ok(text)
    }
}
