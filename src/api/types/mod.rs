//! Request and response types of the HTTP API

pub mod error;
pub mod json;
pub mod search;

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use search::SearchRequest;
