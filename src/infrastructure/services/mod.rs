//! Infrastructure services

mod generation_service;

pub use generation_service::{GenerationConfig, GenerationPipeline, MAX_SEARCH_LIMIT};
