//! Shared application state

use crate::infrastructure::services::GenerationPipeline;

/// Handles shared by every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: GenerationPipeline,
}

impl AppState {
    pub fn new(pipeline: GenerationPipeline) -> Self {
        Self { pipeline }
    }
}
