//! Knowledge base domain - retrieved documents and the retrieval contract

mod document;
mod provider;

pub use document::{MetadataValue, RetrievedDocument};
pub use provider::DocumentRetriever;

#[cfg(test)]
pub use provider::mock::MockRetriever;
