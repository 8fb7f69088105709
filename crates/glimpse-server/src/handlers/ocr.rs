use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use glimpse_core::api_types::{OcrRequest, OcrResponse, OutcomeStatus};

use crate::state::AppState;

pub fn status_code(status: OutcomeStatus) -> StatusCode {
    match status {
        OutcomeStatus::Success | OutcomeStatus::NotRecognized => StatusCode::OK,
        OutcomeStatus::InvalidRequest => StatusCode::BAD_REQUEST,
        OutcomeStatus::NoText | OutcomeStatus::Unparseable => StatusCode::UNPROCESSABLE_ENTITY,
        OutcomeStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Oversized bodies keep their 413; every other body problem is a 400.
fn rejection_status(rejection: &JsonRejection) -> StatusCode {
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// POST /api/ocr: extract post text or profile fields from a screenshot.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn extract_text(
    State(state): State<AppState>,
    body: Result<Json<OcrRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => {
            warn!(error = %rejection, "Malformed OCR request body");
            return (
                rejection_status(&rejection),
                Json(OcrResponse::failure(rejection.body_text())),
            );
        }
    };

    info!(
        mode = req.mode.as_deref().unwrap_or("none"),
        image_len = req.image_base64.as_ref().map_or(0, String::len),
        "Received OCR request"
    );

    let outcome = state.pipeline.run(req).await;
    let status = status_code(outcome.status);

    if status.is_server_error() {
        error!(error = ?outcome.response.error, "OCR request failed");
    } else {
        info!(
            outcome = ?outcome.status,
            success = outcome.response.success,
            "OCR request completed"
        );
    }

    (status, Json(outcome.response))
}
