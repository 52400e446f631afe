//! API Routes
//!
//! Configures the Axum router with all presence analyzer endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, mean_time_weekday_handler, presence_start_end_handler,
    presence_weekday_handler, stats_handler, users_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/v1/users` - Users listing
/// - `GET /api/v1/mean_time_weekday/:user_id` - Mean presence per weekday
/// - `GET /api/v1/presence_weekday/:user_id` - Total presence per weekday
/// - `GET /api/v1/presence_start_end/:user_id` - Mean start and end per weekday
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/users", get(users_handler))
        .route("/mean_time_weekday/:user_id", get(mean_time_weekday_handler))
        .route("/presence_weekday/:user_id", get(presence_weekday_handler))
        .route("/presence_start_end/:user_id", get(presence_start_end_handler));

    Router::new()
        .nest("/api/v1", api_v1)
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
