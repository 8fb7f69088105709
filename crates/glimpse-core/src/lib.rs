pub mod api_types;
pub mod config;
pub mod error;
pub mod extraction;
pub mod mode;

pub use api_types::{HealthResponse, OcrOutcome, OcrRequest, OcrResponse, OutcomeStatus};
pub use config::{AppConfig, AuthScheme, ProviderConfig, ProviderKind};
pub use error::{GlimpseError, Result};
pub use extraction::{
    Extraction, ExtractionRequest, ImageInput, NormalizedProfile, PostExtraction,
    ProfileData, ProfileExtraction, VisionProvider,
};
pub use mode::ExtractionMode;
