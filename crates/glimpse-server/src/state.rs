use std::sync::Arc;

use glimpse_extraction::OcrPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<OcrPipeline>,
}
