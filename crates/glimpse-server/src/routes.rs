use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_check))
        // Extraction
        .route("/api/ocr", post(handlers::ocr::extract_text))
}
