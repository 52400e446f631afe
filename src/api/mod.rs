//! API Module
//!
//! HTTP handlers and routing for the presence analyzer REST API.
//!
//! # Endpoints
//! - `GET /api/v1/users` - Users listing
//! - `GET /api/v1/mean_time_weekday/:user_id` - Mean presence per weekday
//! - `GET /api/v1/presence_weekday/:user_id` - Total presence per weekday
//! - `GET /api/v1/presence_start_end/:user_id` - Mean start and end per weekday
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
