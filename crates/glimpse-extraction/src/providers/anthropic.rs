use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use glimpse_core::config::ProviderConfig;
use glimpse_core::error::Result;
use glimpse_core::{ImageInput, VisionProvider};

use super::{http_client, post_json, MAX_TOKENS};

/// Direct Anthropic Messages API client with a base64 image block.
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

// ── Anthropic Messages API request/response types ──────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Option<Vec<ContentBlock>>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicResponse {
    /// Text of the first content block that carries any, else empty.
    fn text(&self) -> String {
        self.content
            .iter()
            .flatten()
            .find_map(|block| block.text.clone())
            .unwrap_or_default()
    }
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(&config)?,
            config,
        })
    }

    fn build_request<'a>(&'a self, image: &'a ImageInput, prompt: &'a str) -> AnthropicRequest<'a> {
        AnthropicRequest {
            model: &self.config.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: vec![
                    RequestBlock::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type: &image.media_type,
                            data: &image.data_base64,
                        },
                    },
                    RequestBlock::Text { text: prompt },
                ],
            }],
        }
    }
}

#[async_trait]
impl VisionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        self.config.kind.id()
    }

    async fn invoke(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        let request = self.build_request(image, prompt);

        tracing::debug!(
            model = %self.config.model,
            media_type = %image.media_type,
            image_len = image.data_base64.len(),
            "Sending vision request to Anthropic API"
        );

        let response: AnthropicResponse = post_json(&self.client, &self.config, &request).await?;
        let text = response.text();

        tracing::debug!(
            stop_reason = ?response.stop_reason,
            response_len = text.len(),
            "Received Anthropic API response"
        );

        Ok(text)
    }
}
