//! API layer - HTTP endpoints for cache administration

pub mod cache;
pub mod health;
pub mod router;
pub mod state;
pub mod types;

pub use router::{create_router, create_router_with_metrics};
pub use state::AppState;
