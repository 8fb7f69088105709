use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use glimpse_core::api_types::HealthResponse;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let providers = state.pipeline.provider_names();

    // Without a provider every extraction fails, but the service itself is up.
    let status = if providers.is_empty() {
        "degraded".to_string()
    } else {
        "ok".to_string()
    };

    let response = HealthResponse {
        status,
        version: VERSION.to_string(),
        providers,
    };

    (StatusCode::OK, Json(response))
}
