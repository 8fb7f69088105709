use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GlimpseError, Result};
use crate::extraction::{
    Extraction, ExtractionRequest, ImageInput, PostExtraction, ProfileData, ProfileExtraction,
    NOT_A_POST_MESSAGE, NOT_A_PROFILE_MESSAGE, UNPARSEABLE_PROFILE_MESSAGE,
};
use crate::mode::ExtractionMode;

// --- Health ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub providers: Vec<String>,
}

// --- OCR ---

/// Request body of `POST /api/ocr`. Every field is optional on the wire so
/// that missing fields produce a validation message instead of a 422 from
/// the JSON extractor. A field of the wrong JSON type reads as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrRequest {
    #[serde(default, deserialize_with = "string_or_absent")]
    pub image_base64: Option<String>,
    #[serde(default, deserialize_with = "string_or_absent")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_absent")]
    pub mode: Option<String>,
}

fn string_or_absent<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl OcrRequest {
    /// Checks image, media type and mode in that order, stopping at the first
    /// failure.
    pub fn validate(self) -> Result<ExtractionRequest> {
        let image_base64 = non_empty(self.image_base64)
            .ok_or_else(|| GlimpseError::Validation("image_base64 is required".into()))?;
        let media_type = non_empty(self.media_type)
            .ok_or_else(|| GlimpseError::Validation("media_type is required".into()))?;
        let mode: ExtractionMode = self.mode.unwrap_or_default().parse()?;

        Ok(ExtractionRequest {
            image: ImageInput::new(image_base64, media_type),
            mode,
        })
    }
}

/// Response body of `POST /api/ocr`. Absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ExtractionMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_data: Option<ProfileData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_extraction: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OcrResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            mode: None,
            extracted_text: None,
            profile_data: None,
            raw_extraction: None,
            error: Some(message.into()),
        }
    }
}

/// Class of an outcome, used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    /// The model answered but the image was not the expected kind of screenshot.
    NotRecognized,
    InvalidRequest,
    /// Providers answered with no text at all.
    NoText,
    /// Profile output could not be turned into a JSON object.
    Unparseable,
    /// Missing configuration or provider exhaustion.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutcome {
    pub status: OutcomeStatus,
    pub response: OcrResponse,
}

impl OcrOutcome {
    fn failure(status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            response: OcrResponse::failure(message),
        }
    }

    pub fn from_error(err: &GlimpseError) -> Self {
        let status = if err.is_client_error() {
            OutcomeStatus::InvalidRequest
        } else if matches!(err, GlimpseError::NoTextExtracted) {
            OutcomeStatus::NoText
        } else {
            OutcomeStatus::Failed
        };
        Self::failure(status, err.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

impl From<Extraction> for OcrOutcome {
    fn from(extraction: Extraction) -> Self {
        match extraction {
            Extraction::Post(PostExtraction::NotAPost) => {
                Self::failure(OutcomeStatus::NotRecognized, NOT_A_POST_MESSAGE)
            }
            Extraction::Post(PostExtraction::Text(text)) => Self {
                status: OutcomeStatus::Success,
                response: OcrResponse {
                    success: true,
                    mode: Some(ExtractionMode::Post),
                    extracted_text: Some(text),
                    profile_data: None,
                    raw_extraction: None,
                    error: None,
                },
            },
            Extraction::Profile(ProfileExtraction::NotAProfile) => {
                Self::failure(OutcomeStatus::NotRecognized, NOT_A_PROFILE_MESSAGE)
            }
            Extraction::Profile(ProfileExtraction::ModelError(message)) => {
                Self::failure(OutcomeStatus::NotRecognized, message)
            }
            Extraction::Profile(ProfileExtraction::Unparseable) => {
                Self::failure(OutcomeStatus::Unparseable, UNPARSEABLE_PROFILE_MESSAGE)
            }
            Extraction::Profile(ProfileExtraction::Profile(profile)) => Self {
                status: OutcomeStatus::Success,
                response: OcrResponse {
                    success: true,
                    mode: Some(ExtractionMode::Profile),
                    extracted_text: None,
                    profile_data: Some(profile.profile_data),
                    raw_extraction: Some(profile.raw_extraction),
                    error: None,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(image: Option<&str>, media: Option<&str>, mode: Option<&str>) -> OcrRequest {
        OcrRequest {
            image_base64: image.map(String::from),
            media_type: media.map(String::from),
            mode: mode.map(String::from),
        }
    }

    #[test]
    fn validation_checks_image_first() {
        let err = request(None, None, None).validate().unwrap_err();
        assert_eq!(err.to_string(), "image_base64 is required");
    }

    #[test]
    fn validation_rejects_empty_media_type() {
        let err = request(Some("aGk="), Some(""), Some("post"))
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "media_type is required");
    }

    #[test]
    fn validation_rejects_missing_and_unknown_mode() {
        for mode in [None, Some("video")] {
            let err = request(Some("aGk="), Some("image/png"), mode)
                .validate()
                .unwrap_err();
            assert!(matches!(err, GlimpseError::InvalidMode(_)));
        }
    }

    #[test]
    fn mistyped_fields_read_as_absent() {
        let req: OcrRequest = serde_json::from_str(r#"{"mode": 5}"#).unwrap();
        assert_eq!(req.validate().unwrap_err().to_string(), "image_base64 is required");

        let req: OcrRequest =
            serde_json::from_str(r#"{"image_base64": "aGk=", "media_type": ["image/png"], "mode": "post"}"#)
                .unwrap();
        assert_eq!(req.validate().unwrap_err().to_string(), "media_type is required");

        let req: OcrRequest =
            serde_json::from_str(r#"{"image_base64": "aGk=", "media_type": "image/png", "mode": null}"#)
                .unwrap();
        assert!(matches!(req.validate().unwrap_err(), GlimpseError::InvalidMode(_)));
    }

    #[test]
    fn valid_request_builds_extraction_request() {
        let req = request(Some("aGk="), Some("image/png"), Some("profile"))
            .validate()
            .unwrap();
        assert_eq!(req.mode, ExtractionMode::Profile);
        assert_eq!(req.image.data_url(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn failure_response_omits_success_fields() {
        let json = serde_json::to_value(OcrResponse::failure("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "nope" }));
    }

    #[test]
    fn no_text_error_maps_to_its_own_status() {
        let outcome = OcrOutcome::from_error(&GlimpseError::NoTextExtracted);
        assert_eq!(outcome.status, OutcomeStatus::NoText);
        assert_eq!(
            outcome.response.error.as_deref(),
            Some("No text extracted from image")
        );
    }

    #[test]
    fn post_sentinel_is_not_recognized() {
        let outcome = OcrOutcome::from(Extraction::Post(PostExtraction::NotAPost));
        assert_eq!(outcome.status, OutcomeStatus::NotRecognized);
        assert!(!outcome.response.success);
        assert_eq!(outcome.response.error.as_deref(), Some(NOT_A_POST_MESSAGE));
    }
}
