//! HTTP layer

pub mod cache;
pub mod health;
pub mod middleware;
pub mod router;
pub mod search;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
