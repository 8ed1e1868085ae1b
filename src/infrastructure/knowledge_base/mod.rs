//! Document retriever implementations

mod chroma;

pub use chroma::{ChromaConfig, ChromaRetriever, DEFAULT_CHROMA_URL, DEFAULT_COLLECTION};
