use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlimpseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A required request field is missing or empty.
    #[error("{0}")]
    Validation(String),

    #[error("mode must be \"post\" or \"profile\"")]
    InvalidMode(String),

    #[error("{0}")]
    Config(String),

    /// Displayed as the provider's own message so it can be surfaced verbatim.
    #[error("{message}")]
    Provider { provider: String, message: String },

    #[error("No text extracted from image")]
    NoTextExtracted,
}

impl GlimpseError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// True for failures the caller can fix by resubmitting a corrected request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidMode(_))
    }
}

pub type Result<T> = std::result::Result<T, GlimpseError>;
