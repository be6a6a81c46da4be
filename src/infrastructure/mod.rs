//! Infrastructure layer - Store adapters, logging and metrics

pub mod cache;
pub mod logging;
pub mod observability;
