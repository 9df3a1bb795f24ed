//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/status", get(handlers::get_status))
        // Session
        .route("/connect", post(handlers::connect))
        .route("/disconnect", post(handlers::disconnect))
        // Motion
        .route("/slew", post(handlers::slew))
        .route("/abort", post(handlers::abort))
        .route("/tracking", post(handlers::set_tracking))
        .route("/tracking/toggle", post(handlers::toggle_tracking))
        .route(
            "/jog",
            post(handlers::start_jog).delete(handlers::stop_jog),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
