use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("glimpse=info".parse().unwrap()))
        .init();

    let config = glimpse_core::AppConfig::from_env();
    let host = config.server_host.clone();
    let port = config.server_port;

    let pipeline = glimpse_extraction::OcrPipeline::from_config(&config)
        .expect("Failed to build vision provider clients");

    let providers = pipeline.provider_names();
    if providers.is_empty() {
        tracing::warn!("No vision provider configured; set OPENROUTER_API_KEY or ANTHROPIC_API_KEY");
    } else {
        tracing::info!(?providers, "Vision providers configured");
    }

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = routes::create_router()
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_request_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{host}:{port}");
    tracing::info!("Glimpse server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
