use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mode::ExtractionMode;

pub const NOT_A_POST_MESSAGE: &str = "This does not appear to be a LinkedIn post screenshot. \
     Please upload a post screenshot or type your post instead.";
pub const NOT_A_PROFILE_MESSAGE: &str = "This does not appear to be a LinkedIn profile screenshot. \
     Please upload a profile screenshot or enter details manually.";
pub const UNPARSEABLE_PROFILE_MESSAGE: &str =
    "Could not parse profile data from the image. Try entering your profile details manually.";

/// A screenshot as received from the caller: base64 payload plus its MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub data_base64: String,
    pub media_type: String,
}

impl ImageInput {
    pub fn new(data_base64: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            data_base64: data_base64.into(),
            media_type: media_type.into(),
        }
    }

    /// Inline `data:` URL form used by OpenAI-compatible chat APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data_base64)
    }
}

// Payloads can be megabytes of base64; keep them out of logs.
impl std::fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageInput")
            .field("media_type", &self.media_type)
            .field("data_len", &self.data_base64.len())
            .finish()
    }
}

/// A validated extraction request. Only constructed from an [`crate::OcrRequest`]
/// that passed validation, so both strings are non-empty.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub image: ImageInput,
    pub mode: ExtractionMode,
}

/// A single remote vision-capable chat completion backend.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Send the image and prompt as one multi-part message and return the
    /// generated text. An absent text field yields an empty string.
    async fn invoke(&self, image: &ImageInput, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostExtraction {
    /// The model reported the image is not a post screenshot.
    NotAPost,
    Text(String),
}

/// Flattened profile fields ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    pub headline: String,
    pub about: String,
    pub experience: String,
    pub skills: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProfile {
    pub profile_data: ProfileData,
    /// The object exactly as the model returned it.
    pub raw_extraction: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileExtraction {
    /// The model returned the "not a profile" sentinel object.
    NotAProfile,
    /// The model returned some other `{"error": ...}` object.
    ModelError(String),
    /// No JSON object could be recovered from the output.
    Unparseable,
    Profile(NormalizedProfile),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Post(PostExtraction),
    Profile(ProfileExtraction),
}

impl Extraction {
    pub fn mode(&self) -> ExtractionMode {
        match self {
            Self::Post(_) => ExtractionMode::Post,
            Self::Profile(_) => ExtractionMode::Profile,
        }
    }
}
