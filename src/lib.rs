//! Presence Analyzer - workday presence statistics over HTTP
//!
//! Reads check-in/check-out logs, aggregates them per weekday and serves the
//! results as JSON. File loads are memoized in an in-process TTL cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod models;

pub use api::{create_router, AppState};
pub use cache::MemoryCache;
pub use config::Config;
