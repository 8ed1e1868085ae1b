//! Infrastructure layer - adapters for storage, models and the vector index

pub mod cache;
pub mod embedding;
pub mod knowledge_base;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod services;
